//! Core domain types for the Linkmill pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pipeline run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// How a raw source string is interpreted.
///
/// Classification is total: every string maps to exactly one kind, and the
/// same string always maps to the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// An `http://` or `https://` address; content is fetched remotely.
    Url,
    /// An inline Base64 blob that decodes to the content.
    Base64Text,
    /// Literal text used as-is.
    PlainText,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Url => "url",
            Self::Base64Text => "base64",
            Self::PlainText => "plain",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// ResolvedContent
// ---------------------------------------------------------------------------

/// Normalized plain text produced from one source spec.
///
/// Immutable once built; consumed by the artifact builder.
#[derive(Debug, Clone)]
pub struct ResolvedContent {
    /// The normalized text (already Base64-decoded where applicable).
    pub text: String,
    /// The kind the source was classified as.
    pub kind: SourceKind,
    /// The raw source spec as written in the job record.
    pub origin: String,
}

// ---------------------------------------------------------------------------
// JobRecord
// ---------------------------------------------------------------------------

/// One line of the job-definition file: an ordered list of sources merged
/// into a single named artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    /// Raw source specs, in merge order. Never empty.
    pub sources: Vec<String>,
    /// Artifact name, used verbatim as a file stem (no extension or path).
    pub output_name: String,
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// A built output artifact in both encodings.
///
/// `base64_text` is always the canonical re-encoding of `raw_text`, never a
/// copy of any upstream source's own encoding, so decoding it reproduces
/// `raw_text`'s UTF-8 bytes exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The output name from the job record.
    pub name: String,
    /// Merged, deduplicated plain text.
    pub raw_text: String,
    /// Standard Base64 encoding of `raw_text`.
    pub base64_text: String,
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Why a source (or a whole job) failed to contribute content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Transport or non-success HTTP status while fetching a URL.
    FetchError,
    /// Base64-classified content that could not be decoded to UTF-8 text.
    DecodeError,
    /// Every source in the job failed; no artifact was built.
    NoContent,
    /// The run was cancelled while this source was still resolving.
    Cancelled,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FetchError => "fetch_error",
            Self::DecodeError => "decode_error",
            Self::NoContent => "no_content",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A recorded per-source (or per-job) failure. Never aborts the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Output name of the job the source belonged to.
    pub output_name: String,
    /// The offending source spec (the job's name for whole-job failures).
    pub origin: String,
    /// Failure category.
    pub reason: FailureReason,
    /// Human-readable detail for the operator log.
    pub detail: String,
}

// ---------------------------------------------------------------------------
// ArtifactMeta / RunReport
// ---------------------------------------------------------------------------

/// Metadata for one persisted artifact, as surfaced in the run report and
/// consumed by the index generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Artifact name (file stem).
    pub name: String,
    /// Relative path of the raw-text encoding (e.g. `normal/foo.txt`).
    pub raw_path: String,
    /// Relative path of the Base64 encoding (e.g. `base64/foo.b64`).
    pub encoded_path: String,
    /// SHA-256 hash of the raw text.
    pub sha256: String,
    /// Size of the raw text in bytes.
    pub size_bytes: usize,
    /// Number of sources that contributed content.
    pub source_count: usize,
    /// Number of unique lines in the raw text.
    pub line_count: usize,
}

/// Aggregate outcome of one pipeline run.
///
/// Built incrementally while jobs are processed; per-source failures are
/// collected here rather than thrown, so a partially failing run still
/// yields every artifact it can.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Artifacts that were built and persisted, in job order.
    pub artifacts: Vec<ArtifactMeta>,
    /// Per-source and per-job failures, in discovery order.
    pub failures: Vec<SourceFailure>,
    /// Total number of job records processed.
    pub jobs_total: usize,
    /// Number of jobs where every source failed.
    pub jobs_failed: usize,
    /// Whether the run was cut short by an interrupt or deadline. The
    /// artifacts and failures above cover only the jobs that ran.
    #[serde(default)]
    pub cancelled: bool,
}

impl RunReport {
    /// Whether the run produced no artifacts despite having jobs to do.
    pub fn is_empty_failure(&self) -> bool {
        self.jobs_total > 0 && self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn source_kind_display() {
        assert_eq!(SourceKind::Url.to_string(), "url");
        assert_eq!(SourceKind::Base64Text.to_string(), "base64");
        assert_eq!(SourceKind::PlainText.to_string(), "plain");
    }

    #[test]
    fn report_serialization() {
        let report = RunReport {
            run_id: RunId::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            artifacts: vec![ArtifactMeta {
                name: "merged".into(),
                raw_path: "normal/merged.txt".into(),
                encoded_path: "base64/merged.b64".into(),
                sha256: "deadbeef".into(),
                size_bytes: 12,
                source_count: 2,
                line_count: 3,
            }],
            failures: vec![SourceFailure {
                output_name: "merged".into(),
                origin: "https://example.com/list".into(),
                reason: FailureReason::FetchError,
                detail: "HTTP 500".into(),
            }],
            jobs_total: 1,
            jobs_failed: 0,
            cancelled: false,
        };

        let json = serde_json::to_string_pretty(&report).expect("serialize");
        let parsed: RunReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.artifacts.len(), 1);
        assert_eq!(parsed.failures[0].reason, FailureReason::FetchError);
        assert!(json.contains("fetch_error"));
    }

    #[test]
    fn empty_failure_detection() {
        let mut report = RunReport {
            run_id: RunId::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            artifacts: vec![],
            failures: vec![],
            jobs_total: 2,
            jobs_failed: 2,
            cancelled: false,
        };
        assert!(report.is_empty_failure());

        report.jobs_total = 0;
        assert!(!report.is_empty_failure());
    }
}
