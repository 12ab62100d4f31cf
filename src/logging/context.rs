use crate::cli::{Args, Command};

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A user runs a command from a terminal.
    Interactive,
    /// `--quiet` runs; results only go to the log file.
    Quiet,
    /// Startup hook runs, which never report progress on the console.
    Background,
}

impl ExecutionContext {
    /// Returns `true` when console sinks should be disabled.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Quiet | ExecutionContext::Background)
    }
}

/// Derive the active execution context from the parsed CLI arguments.
pub fn detect_context(args: &Args) -> ExecutionContext {
    if args.store.quiet {
        return ExecutionContext::Quiet;
    }
    match args.command {
        Command::Bootstrap => ExecutionContext::Background,
        Command::RegenerateDedications
        | Command::OverwriteDedications
        | Command::RegenerateFeats
        | Command::OverwriteFeats
        | Command::Rebuild => ExecutionContext::Interactive,
    }
}
