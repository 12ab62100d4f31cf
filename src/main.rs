use anyhow::Context;
use clap::Parser;
use true_archetype::{cli, logging, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let _guard = logging::init(&args).context("failed to initialize logging")?;
    tracing::debug!(command = ?args.command, "starting");
    cli::run(args).await
}
