//! # clgen Core Library
//!
//! Building blocks for concurrent-learning workflows that train machine-learning
//! interatomic potentials: exploration settings, candidate screening, and the
//! configuration plumbing needed to hand work off to an external workflow service.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Plain data models (`Frame`, `ConfigurationSet`,
//!   `ModelDevi`), element data, geometry helpers, and file I/O such as the
//!   binary file wrapper and object artifacts.
//!
//! - **[`exploration`]: The Exploration Layer.** Molecular-dynamics settings,
//!   configuration filters, and exploration reports that classify sampled frames
//!   by model deviation and select candidates for labeling.
//!
//! - **[`workflow`]: The Service Configuration.** An explicitly scoped
//!   configuration for the workflow-orchestration service, split into general
//!   and storage-backend settings.

pub mod core;
pub mod exploration;
pub mod workflow;
