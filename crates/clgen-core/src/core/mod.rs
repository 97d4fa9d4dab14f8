//! # Core Module
//!
//! Data models and I/O shared by the exploration and workflow layers.
//!
//! ## Architecture
//!
//! - **Frames and Deviations** ([`models`]) - Sampled configurations and per-trajectory model deviation
//! - **Element Data** ([`elements`]) - Covalent radii used for geometric screening
//! - **File I/O** ([`io`]) - Binary file wrapper, object artifacts, and data file readers/writers
//! - **Utilities** ([`utils`]) - Periodic-cell geometry

pub mod elements;
pub mod io;
pub mod models;
pub mod utils;
