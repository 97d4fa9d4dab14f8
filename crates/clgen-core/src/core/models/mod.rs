//! Data models for sampled configurations and model deviation.
//!
//! - [`frame`] - A single sampled structure and the typed set that groups frames
//! - [`model_devi`] - Per-trajectory model deviation recorded during exploration

pub mod frame;
pub mod model_devi;
