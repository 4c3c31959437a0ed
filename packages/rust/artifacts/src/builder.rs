//! Artifact building: merge, dedup, re-encode.
//!
//! Deduplication runs on the merged text, not per source, so identical
//! lines appearing in two sources for the same output collapse into one.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use linkmill_shared::{Artifact, ResolvedContent};
use tracing::debug;

use std::collections::HashSet;

/// An ordered set of lines: first occurrence wins, order preserved.
///
/// Kept as an explicit sequence + membership set so the dedup contract is
/// visible rather than hidden inside map iteration order.
#[derive(Debug, Default)]
struct OrderedLineSet {
    lines: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedLineSet {
    /// Insert a line unless an identical one (case- and whitespace-
    /// sensitive) was inserted before.
    fn insert(&mut self, line: &str) {
        if self.seen.insert(line.to_string()) {
            self.lines.push(line.to_string());
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Build the artifact for one job from its resolved contents.
///
/// `contents` must be non-empty (the pipeline never calls this for a job
/// whose every source failed) and is consumed in input order:
/// 1. each content's text is trimmed at its boundaries,
/// 2. contents are joined with one blank line between each pair,
/// 3. empty and whitespace-only lines are dropped,
/// 4. remaining lines are deduplicated by first occurrence,
/// 5. `base64_text` is the canonical re-encoding of the merged text.
///
/// Building twice from the same inputs yields identical output.
pub fn build(name: &str, contents: &[ResolvedContent]) -> Artifact {
    debug_assert!(!contents.is_empty(), "build requires at least one content");

    let merged = contents
        .iter()
        .map(|c| c.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut set = OrderedLineSet::default();
    for line in merged.lines() {
        if line.trim().is_empty() {
            continue;
        }
        set.insert(line);
    }

    let raw_text = set.into_lines().join("\n");
    let base64_text = STANDARD.encode(raw_text.as_bytes());

    debug!(
        name,
        sources = contents.len(),
        bytes = raw_text.len(),
        "artifact built"
    );

    Artifact {
        name: name.to_string(),
        raw_text,
        base64_text,
    }
}
