//! Provides input/output functionality for files produced and consumed by exploration.
//!
//! This module contains the binary file wrapper used to ship opaque inputs (models,
//! templates) between steps, object artifacts, and readers/writers for
//! configuration sets and model-deviation tables behind the [`traits::DataFile`] trait.

pub mod artifact;
pub mod binary_file;
pub mod configuration_set;
pub mod model_devi;
pub mod traits;
