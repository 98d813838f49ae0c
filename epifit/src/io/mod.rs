//! File-facing collaborators of the numerical core.

pub mod debug_log;
pub mod grid_artifact;
pub mod reported_csv;
