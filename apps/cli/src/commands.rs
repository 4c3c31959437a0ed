//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use linkmill_core::{ProgressReporter, run_pipeline};
use linkmill_resolver::HttpFetcher;
use linkmill_shared::{RunOptions, RunReport, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Linkmill — merge link lists into raw and Base64 artifacts.
#[derive(Parser)]
#[command(
    name = "linkmill",
    version,
    about = "Resolve URL/Base64/text sources, merge and dedup them, and publish raw + Base64 artifacts with an index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process the job file and publish all artifacts.
    Run {
        /// Job-definition file (defaults to config value, then links.txt).
        #[arg(short, long)]
        jobs: Option<PathBuf>,

        /// Output root directory.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Repository identifier (owner/repo) for absolute index links.
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: Option<String>,

        /// Per-request fetch timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Maximum concurrent source fetches.
        #[arg(long)]
        concurrency: Option<u32>,

        /// User-Agent header override for fetch requests.
        #[arg(long)]
        user_agent: Option<String>,

        /// Abort the run after this many seconds, keeping the partial report.
        #[arg(long)]
        run_timeout: Option<u64>,

        /// Print the full run report as JSON on stdout.
        #[arg(long)]
        report_json: bool,
    },

    /// Parse the job file and show classifications without fetching.
    Check {
        /// Job-definition file (defaults to config value, then links.txt).
        #[arg(short, long)]
        jobs: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "linkmill=info",
        1 => "linkmill=debug",
        _ => "linkmill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            jobs,
            out,
            repository,
            timeout,
            concurrency,
            user_agent,
            run_timeout,
            report_json,
        } => {
            cmd_run(
                jobs,
                out,
                repository,
                timeout,
                concurrency,
                user_agent,
                run_timeout,
                report_json,
            )
            .await
        }
        Command::Check { jobs } => cmd_check(jobs),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Merge config-file values with CLI flags; flags win.
fn resolve_options(
    out: Option<PathBuf>,
    repository: Option<String>,
    timeout: Option<u64>,
    concurrency: Option<u32>,
    user_agent: Option<String>,
) -> Result<(RunOptions, PathBuf)> {
    let config = load_config()?;
    let mut opts = RunOptions::from(&config);

    if let Some(out) = out {
        opts.output_root = out;
    }
    if repository.is_some() {
        opts.repository = repository;
    }
    if let Some(timeout) = timeout {
        opts.timeout_secs = timeout;
    }
    if let Some(concurrency) = concurrency {
        opts.concurrency = concurrency;
    }
    if user_agent.is_some() {
        opts.user_agent = user_agent;
    }

    let jobs_file = PathBuf::from(&config.defaults.jobs_file);
    Ok((opts, jobs_file))
}

async fn cmd_run(
    jobs: Option<PathBuf>,
    out: Option<PathBuf>,
    repository: Option<String>,
    timeout: Option<u64>,
    concurrency: Option<u32>,
    user_agent: Option<String>,
    run_timeout: Option<u64>,
    report_json: bool,
) -> Result<()> {
    let (opts, default_jobs_file) =
        resolve_options(out, repository, timeout, concurrency, user_agent)?;
    let jobs_path = jobs.unwrap_or(default_jobs_file);

    let jobs = linkmill_jobfile::read_jobs(&jobs_path)?;
    info!(jobs = jobs.len(), path = %jobs_path.display(), "starting run");

    // Ctrl-C (and the optional run deadline) cancel in-flight fetches and
    // skip remaining jobs; the partial report is still emitted.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match run_timeout {
                Some(secs) => tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                },
                None => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
            cancel.cancel();
        });
    }

    let fetcher = HttpFetcher::new(opts.timeout_secs, opts.user_agent.as_deref())?;
    let progress = BarProgress::new(jobs.len());

    let report = run_pipeline(&opts, &jobs, fetcher, &progress, cancel).await?;
    progress.finish(&report);

    if report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.cancelled {
        return Err(eyre!(
            "run cancelled after {} of {} jobs",
            report.artifacts.len() + report.jobs_failed,
            report.jobs_total
        ));
    }

    // Partial failures are fine; a run that produced nothing from a
    // non-empty job list is an overall failure.
    if report.is_empty_failure() {
        return Err(eyre!(
            "no artifacts produced: all {} jobs failed",
            report.jobs_total
        ));
    }

    Ok(())
}

fn cmd_check(jobs: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let jobs_path = jobs.unwrap_or_else(|| PathBuf::from(&config.defaults.jobs_file));

    let records = linkmill_jobfile::read_jobs(&jobs_path)?;

    println!("{} job(s) in {}:", records.len(), jobs_path.display());
    for record in &records {
        println!("  {} <-", record.output_name);
        for spec in &record.sources {
            let kind = linkmill_resolver::classify(spec);
            println!("    [{kind}] {}", truncate(spec, 72));
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Presentation helpers
// ---------------------------------------------------------------------------

fn print_summary(report: &RunReport) {
    println!(
        "Published {} artifact(s), {} job(s) failed, {} source failure(s).",
        report.artifacts.len(),
        report.jobs_failed,
        report.failures.len()
    );

    for failure in &report.failures {
        println!(
            "  [{}] {} <- {}: {}",
            failure.reason, failure.output_name, failure.origin, failure.detail
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    }
}

/// Indicatif-backed progress reporter: one bar across all jobs.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .expect("progress template"),
        );
        Self { bar }
    }

    fn finish(&self, report: &RunReport) {
        self.bar
            .finish_with_message(format!("{} artifact(s)", report.artifacts.len()));
    }
}

impl ProgressReporter for BarProgress {
    fn job_started(&self, name: &str, _current: usize, _total: usize) {
        self.bar.set_message(name.to_string());
    }

    fn source_resolved(&self, _origin: &str, _ok: bool) {}

    fn job_finished(&self, _name: &str, _ok: bool) {
        self.bar.inc(1);
    }
}
