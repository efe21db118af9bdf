pub mod common;
pub mod completions;
pub mod config;
pub mod plan;
pub mod scan;
pub mod sync;
