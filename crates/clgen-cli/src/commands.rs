pub mod filter;
pub mod md;
pub mod pack;
pub mod report;
pub mod workflow;
