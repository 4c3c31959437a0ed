//! Pipeline orchestration and artifact persistence for Linkmill.

pub mod persist;
pub mod pipeline;

pub use persist::OutputLayout;
pub use pipeline::{ProgressReporter, SilentProgress, run_pipeline};
