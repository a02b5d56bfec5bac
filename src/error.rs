use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobTrackError>;

#[derive(Debug, Error)]
pub enum JobTrackError {
    #[error("Job application not found: {0}")]
    JobNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Conflicting modification: {0}")]
    Conflict(String),

    #[error("Invalid board state: {0}")]
    InvalidBoard(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}

impl JobTrackError {
    /// True for stale references (the job or a column vanished underneath a move)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::JobNotFound(_) | Self::ColumnNotFound(_) | Self::BoardNotFound(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Move failures never end the board session; the view resyncs from the feed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::JobNotFound(_)
                | Self::ColumnNotFound(_)
                | Self::Conflict(_)
                | Self::StorageError(_)
        )
    }
}
