//! Job-definition file reader.
//!
//! The jobs file is newline-delimited text. Blank lines and lines starting
//! with `#` are comments. Every other line maps sources to one output:
//!
//! ```text
//! source1|source2|...,output_name
//! ```
//!
//! Exactly one comma separates the `|`-delimited source list from the
//! output name. Malformed lines are skipped with a warning, never fatal;
//! a missing file is a fatal config error.

mod parser;

use std::path::Path;

use linkmill_shared::{JobRecord, LinkmillError, Result};
use tracing::info;

pub use parser::parse_jobs;

/// Read and parse the job-definition file at `path`.
///
/// Returns the parsed records in file order. A missing or unreadable file
/// aborts the run ([`LinkmillError::Config`]); malformed lines inside the
/// file do not.
pub fn read_jobs(path: &Path) -> Result<Vec<JobRecord>> {
    if !path.exists() {
        return Err(LinkmillError::config(format!(
            "jobs file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| LinkmillError::io(path, e))?;

    let jobs = parse_jobs(&content);
    info!(path = %path.display(), jobs = jobs.len(), "job file loaded");
    Ok(jobs)
}
