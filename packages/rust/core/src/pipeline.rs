//! End-to-end run pipeline: jobs → resolve → merge → persist → index.
//!
//! One run walks the job records in input order. Within a job, sources
//! resolve with bounded parallelism but fold into the artifact in source
//! order regardless of completion order. Per-source failures are recorded
//! and never abort the run; a job whose every source fails is recorded as
//! a whole-job failure and later jobs still run. Only setup failures
//! (unwritable output root) escape as errors. An operator interrupt or
//! run deadline cancels in-flight fetches and yields the partial report.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use linkmill_resolver::{Fetcher, Resolver};
use linkmill_shared::{
    ArtifactMeta, FailureReason, JobRecord, LinkmillError, ResolvedContent, Result, RunId,
    RunOptions, RunReport, SourceFailure,
};

use crate::persist::OutputLayout;

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a job starts (1-based position, total job count).
    fn job_started(&self, name: &str, current: usize, total: usize);
    /// Called when one source finished resolving.
    fn source_resolved(&self, origin: &str, ok: bool);
    /// Called when a job finished (artifact built or whole-job failure).
    fn job_finished(&self, name: &str, ok: bool);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn job_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn source_resolved(&self, _origin: &str, _ok: bool) {}
    fn job_finished(&self, _name: &str, _ok: bool) {}
}

/// Run the full pipeline over `jobs`.
///
/// Returns the aggregate [`RunReport`]; the caller decides how to present
/// it (and whether an artifact-less run counts as an overall failure).
///
/// Cancelling `cancel` aborts in-flight resolutions and skips remaining
/// jobs; the report covers whatever completed before the cut, with
/// `cancelled` set. The index is still written from the surviving
/// artifacts so the output directory stays consistent.
#[instrument(skip_all, fields(jobs = jobs.len()))]
pub async fn run_pipeline<F: Fetcher + 'static>(
    opts: &RunOptions,
    jobs: &[JobRecord],
    fetcher: F,
    progress: &dyn ProgressReporter,
    cancel: CancellationToken,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, jobs = jobs.len(), concurrency = opts.concurrency, "starting run");

    // Setup failures abort before any job is processed.
    let layout = OutputLayout::prepare(opts)?;

    let resolver = Arc::new(Resolver::new(fetcher));
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1) as usize));

    let mut artifacts: Vec<ArtifactMeta> = Vec::new();
    let mut failures: Vec<SourceFailure> = Vec::new();
    let mut jobs_failed: usize = 0;

    for (i, job) in jobs.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(remaining = jobs.len() - i, "run cancelled, skipping remaining jobs");
            break;
        }

        progress.job_started(&job.output_name, i + 1, jobs.len());

        let contents =
            resolve_job_sources(&resolver, &semaphore, job, &cancel, &mut failures, progress).await;

        if cancel.is_cancelled() {
            // Dropping the partial job beats publishing an artifact that is
            // silently missing sources.
            warn!(name = %job.output_name, "run cancelled mid-job, dropping partial content");
            progress.job_finished(&job.output_name, false);
            break;
        }

        if contents.is_empty() {
            warn!(name = %job.output_name, "every source failed, no artifact");
            failures.push(SourceFailure {
                output_name: job.output_name.clone(),
                origin: job.output_name.clone(),
                reason: FailureReason::NoContent,
                detail: format!("all {} sources failed", job.sources.len()),
            });
            jobs_failed += 1;
            progress.job_finished(&job.output_name, false);
            continue;
        }

        let source_count = contents.len();
        let artifact = linkmill_artifacts::build(&job.output_name, &contents);
        let meta = layout.write_artifact(&artifact, source_count)?;

        info!(
            name = %meta.name,
            sources = source_count,
            lines = meta.line_count,
            bytes = meta.size_bytes,
            "artifact published"
        );

        artifacts.push(meta);
        progress.job_finished(&job.output_name, true);
    }

    // The index sorts by name itself; the report keeps job order.
    let index = linkmill_artifacts::generate_index(
        opts.repository.as_deref(),
        &artifacts,
        Utc::now(),
    );
    let index_path = layout.write_index(&index)?;

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        artifacts,
        failures,
        jobs_total: jobs.len(),
        jobs_failed,
        cancelled: cancel.is_cancelled(),
    };

    info!(
        run_id = %report.run_id,
        artifacts = report.artifacts.len(),
        failures = report.failures.len(),
        jobs_failed = report.jobs_failed,
        cancelled = report.cancelled,
        index = %index_path.display(),
        elapsed_ms = start.elapsed().as_millis(),
        "run complete"
    );

    Ok(report)
}

/// Resolve all sources of one job with bounded parallelism.
///
/// Tasks are spawned in source order and awaited in the same order, so the
/// returned contents preserve the job's source ordering no matter which
/// fetch completes first. Failures are appended to `failures` tagged with
/// the job's output name. Cancellation wins over any still-running fetch;
/// cancelled sources are recorded with their own reason.
async fn resolve_job_sources<F: Fetcher + 'static>(
    resolver: &Arc<Resolver<F>>,
    semaphore: &Arc<Semaphore>,
    job: &JobRecord,
    cancel: &CancellationToken,
    failures: &mut Vec<SourceFailure>,
    progress: &dyn ProgressReporter,
) -> Vec<ResolvedContent> {
    let mut handles = Vec::with_capacity(job.sources.len());

    for spec in &job.sources {
        let resolver = Arc::clone(resolver);
        let sem = Arc::clone(semaphore);
        let cancel = cancel.clone();
        let spec = spec.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            tokio::select! {
                _ = cancel.cancelled() => None,
                outcome = resolver.resolve(&spec) => Some(outcome),
            }
        }));
    }

    let mut contents = Vec::with_capacity(handles.len());

    for (spec, handle) in job.sources.iter().zip(handles) {
        let outcome = match handle.await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                progress.source_resolved(spec, false);
                failures.push(SourceFailure {
                    output_name: job.output_name.clone(),
                    origin: spec.clone(),
                    reason: FailureReason::Cancelled,
                    detail: "run cancelled".into(),
                });
                continue;
            }
            Err(e) => Err(LinkmillError::Fetch(format!("resolution task failed: {e}"))),
        };

        match outcome {
            Ok(content) => {
                progress.source_resolved(spec, true);
                contents.push(content);
            }
            Err(e) => {
                warn!(name = %job.output_name, origin = %spec, error = %e, "source failed");
                progress.source_resolved(spec, false);
                failures.push(SourceFailure {
                    output_name: job.output_name.clone(),
                    origin: spec.clone(),
                    reason: failure_reason(&e),
                    detail: e.to_string(),
                });
            }
        }
    }

    contents
}

/// Map an isolated resolution error onto the report taxonomy.
fn failure_reason(err: &LinkmillError) -> FailureReason {
    match err {
        LinkmillError::Decode { .. } => FailureReason::DecodeError,
        _ => FailureReason::FetchError,
    }
}
