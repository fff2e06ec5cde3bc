use thiserror::Error;

/// Failures of a commit source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid commit list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("commit not found: {sha}")]
    NotFound { sha: String },

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
