use crate::{
    cli::args::StoreArgs,
    core::{
        bootstrap as startup, ConfigLoader, ConfigValidator, ConsoleNotifier, FsStore, RunStatus,
        TrueArchetype,
    },
    Result,
};
use anyhow::{anyhow, Context};
use std::sync::Arc;

/// Build the service over the file-backed store in `--data-dir`.
pub fn open(args: &StoreArgs) -> Result<TrueArchetype> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_from_data_dir(&args.data_dir)?,
    };
    ConfigValidator::validate(&config)?;

    if !args.data_dir.is_dir() {
        return Err(anyhow!(
            "data directory {} does not exist",
            args.data_dir.display()
        ));
    }
    tracing::debug!(data_dir = %args.data_dir.display(), "opening file store");

    Ok(TrueArchetype::from_store(
        FsStore::new(&args.data_dir),
        Arc::new(ConsoleNotifier::new()),
        config,
    ))
}

pub async fn regenerate_dedications(app: &TrueArchetype, interactive: bool) -> Result<()> {
    tracing::info!("Regenerating True Archetype dedications");
    let status = app.regenerate_dedications(interactive).await;
    require_completed("regenerate-dedications", &[status])
}

pub async fn overwrite_dedications(app: &TrueArchetype, interactive: bool) -> Result<()> {
    let status = app.overwrite_dedications(interactive).await;
    require_completed("overwrite-dedications", &[status])
}

pub async fn regenerate_feats(app: &TrueArchetype, interactive: bool) -> Result<()> {
    tracing::info!("Regenerating True Archetype feats");
    let status = app.regenerate_feats(interactive).await;
    require_completed("regenerate-feats", &[status])
}

pub async fn overwrite_feats(app: &TrueArchetype, interactive: bool) -> Result<()> {
    let status = app.overwrite_feats(interactive).await;
    require_completed("overwrite-feats", &[status])
}

pub async fn rebuild(app: &TrueArchetype, interactive: bool) -> Result<()> {
    tracing::info!("Rebuilding dedications and feats");
    let statuses = app.rebuild(interactive).await;
    require_completed("rebuild", &statuses)?;
    if interactive {
        let written: usize = statuses.iter().filter_map(RunStatus::count).sum();
        println!("Rebuild completed ({} documents written)", written);
    }
    Ok(())
}

pub async fn bootstrap(app: &TrueArchetype, interactive: bool) -> Result<()> {
    let report = startup::bootstrap(app)
        .await
        .context("bootstrap failed")?;

    if interactive {
        if !report.enabled {
            println!("True Archetype is disabled; nothing to do.");
        } else {
            println!("Registered {} feat section(s)", report.sections_added);
            println!("Dedications: {}", describe(&report.dedications));
            println!("Feats: {}", describe(&report.feats));
        }
    }
    require_completed("bootstrap", &[report.dedications, report.feats])
}

fn require_completed(operation: &str, statuses: &[RunStatus]) -> Result<()> {
    match statuses.iter().find(|status| !status.is_success()) {
        None => Ok(()),
        Some(status) => Err(anyhow!("{} did not complete: {}", operation, describe(status))),
    }
}

fn describe(status: &RunStatus) -> String {
    match status {
        RunStatus::Completed { count } => format!("completed ({} documents)", count),
        RunStatus::Aborted { category } => format!("aborted ({})", category),
        RunStatus::Failed { category } => format!("failed ({})", category),
        RunStatus::Skipped => "skipped".to_string(),
    }
}
