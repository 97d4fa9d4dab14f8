//! # Workflow Module
//!
//! Configuration handed to the external workflow-orchestration service.
//!
//! There is no process-wide configuration object: a [`config::WorkflowConfig`] is
//! built from user settings and passed by reference to whatever submits work.

pub mod config;
