//! # Exploration Module
//!
//! Everything needed to describe an exploration stage and judge what it sampled.
//!
//! ## Architecture
//!
//! - **MD Settings** ([`md_settings`]) - Ensemble, timestep, and schedule parameters of an MD run
//! - **Configuration Filters** ([`filter`]) - Predicates that admit or reject sampled frames
//! - **Exploration Reports** ([`report`]) - Failed/accurate/candidate statistics and candidate selection

pub mod filter;
pub mod md_settings;
pub mod report;
