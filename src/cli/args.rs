use clap::Args;
use std::path::PathBuf;

/// Options shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Directory holding packs/, settings.json and true-archetype.toml (default: current directory)
    #[arg(long, global = true, default_value = ".", value_name = "PATH")]
    pub data_dir: PathBuf,

    /// Path to custom config file (default: {data-dir}/true-archetype.toml)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Run non-interactively: only errors are shown, results go to the log
    #[arg(long, short = 'q', global = true, help_heading = "Output Options")]
    pub quiet: bool,
}

impl StoreArgs {
    pub fn interactive(&self) -> bool {
        !self.quiet
    }
}

impl Default for StoreArgs {
    fn default() -> Self {
        StoreArgs {
            data_dir: PathBuf::from("."),
            config: None,
            quiet: false,
        }
    }
}
