use thiserror::Error;

#[derive(Debug, Error)]
pub enum MdtError {
    #[error("not initialized: run 'mdt init'")]
    NotInitialized,

    #[error("change request not found: {0}")]
    CrNotFound(String),

    #[error("change request already exists: {0}")]
    CrExists(String),

    #[error("invalid ticket key '{0}': expected PROJECT-NUMBER (e.g. MDT-066)")]
    InvalidTicketKey(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("missing context for {key}: {reason}")]
    MissingContext { key: String, reason: String },

    #[error("invalid selection for decision '{decision}': option {index} does not exist")]
    InvalidSelection { decision: String, index: usize },

    #[error("selection count mismatch: {expected} decision point(s), {got} selection(s)")]
    SelectionCount { expected: usize, got: usize },

    #[error("design blocked by {count} violation(s)")]
    DesignBlocked { count: usize },

    #[error("artifact not found in {key}: {path}")]
    ArtifactNotFound { key: String, path: String },

    #[error("section conflict in {key}: {reason}")]
    SectionConflict { key: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MdtError {
    /// Process exit code reported by the CLI:
    /// 1 invalid input, 2 store error, 4 not found, 5 config error,
    /// 6 general (a design blocked by validation reports as general).
    pub fn exit_code(&self) -> i32 {
        match self {
            MdtError::InvalidTicketKey(_)
            | MdtError::InvalidRole(_)
            | MdtError::InvalidStatus(_)
            | MdtError::MissingContext { .. }
            | MdtError::InvalidSelection { .. }
            | MdtError::SelectionCount { .. }
            | MdtError::CrExists(_) => 1,
            MdtError::Io(_)
            | MdtError::Yaml(_)
            | MdtError::Json(_)
            | MdtError::SectionConflict { .. } => 2,
            MdtError::CrNotFound(_) | MdtError::ArtifactNotFound { .. } => 4,
            MdtError::NotInitialized | MdtError::Config(_) => 5,
            MdtError::DesignBlocked { .. } => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, MdtError>;
