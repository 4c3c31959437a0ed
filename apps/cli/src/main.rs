//! Linkmill CLI — merge content sources into published list artifacts.
//!
//! Reads a job file mapping sources (URLs, inline Base64, literal text)
//! to named outputs, resolves and merges them, and publishes each output
//! in raw and Base64 encodings plus a Markdown index.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
