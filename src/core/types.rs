use serde::{Deserialize, Serialize};

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    MissingCollection,
    MissingPrecondition,
    TransformFailure,
    StoreError,
    ValidationError,
    SerializationError,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
}

/// Which half of the pipeline an entry point drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Dedications,
    Feats,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Dedications => write!(f, "dedications"),
            ContentKind::Feats => write!(f, "feats"),
        }
    }
}

/// Outcome of one entry-point invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The run finished; `count` documents were produced or replaced.
    Completed { count: usize },
    /// A precondition failed before anything was mutated.
    Aborted { category: ErrorCategory },
    /// A store call failed mid-run; earlier writes stay applied.
    Failed { category: ErrorCategory },
    /// Nothing to do (feature disabled or collection already populated).
    Skipped,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed { .. } | RunStatus::Skipped)
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            RunStatus::Completed { count } => Some(*count),
            _ => None,
        }
    }
}
