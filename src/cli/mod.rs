pub mod args;
pub mod commands;

pub use args::StoreArgs;
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "true-archetype")]
#[command(version = crate::VERSION)]
#[command(about = "Generate True Archetype dedications and feats from a Pathfinder 2e feat catalog")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: regenerate-dedications, regenerate-feats, review the working collections, then overwrite-dedications and overwrite-feats. `rebuild` runs all four."
)]
pub struct Args {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    #[command(
        about = "Clone multiclass dedications into the working collection",
        long_about = "Empties the working dedication collection, clones every catalog item tagged both dedication and multiclass as a level 1 True Archetype, and stores the original -> clone id map.",
        after_help = "Example:\n    true-archetype regenerate-dedications --data-dir ./world"
    )]
    RegenerateDedications,
    #[command(
        about = "Replace the published dedications with the working ones",
        after_help = "Example:\n    true-archetype overwrite-dedications --data-dir ./world"
    )]
    OverwriteDedications,
    #[command(
        about = "Clone feats that depend on a dedication into the working collection",
        long_about = "Requires a stored dedication map. Selects catalog feats whose prerequisites name a dedication, follows prerequisite chains for a bounded number of hops, and rewrites names, prerequisites, levels and rules of the clones.",
        after_help = "Example:\n    true-archetype regenerate-feats --data-dir ./world"
    )]
    RegenerateFeats,
    #[command(
        about = "Replace the published feats with the working ones",
        after_help = "Example:\n    true-archetype overwrite-feats --data-dir ./world"
    )]
    OverwriteFeats,
    #[command(
        about = "Regenerate and publish dedications, then feats",
        after_help = "Example:\n    true-archetype rebuild --quiet"
    )]
    Rebuild,
    #[command(
        about = "Register feat sections and fill empty published collections",
        long_about = "Does nothing when the isEnabled setting is false. Otherwise registers the campaign feat sections and regenerates every published collection that is still empty.",
        after_help = "Example:\n    true-archetype bootstrap --data-dir ./world"
    )]
    Bootstrap,
}

pub async fn run(args: Args) -> crate::Result<()> {
    let app = commands::open(&args.store)?;
    let interactive = args.store.interactive();
    match args.command {
        Command::RegenerateDedications => commands::regenerate_dedications(&app, interactive).await,
        Command::OverwriteDedications => commands::overwrite_dedications(&app, interactive).await,
        Command::RegenerateFeats => commands::regenerate_feats(&app, interactive).await,
        Command::OverwriteFeats => commands::overwrite_feats(&app, interactive).await,
        Command::Rebuild => commands::rebuild(&app, interactive).await,
        Command::Bootstrap => commands::bootstrap(&app, interactive).await,
    }
}
