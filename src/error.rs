use thiserror::Error;

/// Order uploader client errors
#[derive(Debug, Error)]
pub enum UploaderError {
    /// Rejected before any network call (extension, size)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport-level failure (connection refused, reset, DNS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error: status {status}: {body}")]
    Server { status: u16, body: String },

    /// Requested page outside the known page range
    #[error("Invalid page {page} (total pages: {total_pages})")]
    InvalidPage { page: u32, total_pages: u32 },

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A newer upload replaced the session this work belonged to
    #[error("Upload session {0} was replaced")]
    SessionReplaced(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UploaderError>;

impl UploaderError {
    /// Network or server failure while talking to the order service
    pub fn is_transmission(&self) -> bool {
        matches!(self, UploaderError::Network(_) | UploaderError::Server { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, UploaderError::Validation(_))
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<UploaderError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err: UploaderError = e.into();
            match err {
                UploaderError::Other(s) => UploaderError::Other(format!("{}: {}", msg, s)),
                UploaderError::Config(s) => UploaderError::Config(format!("{}: {}", msg, s)),
                UploaderError::Validation(s) => {
                    UploaderError::Validation(format!("{}: {}", msg, s))
                }
                UploaderError::Server { status, body } => UploaderError::Server {
                    status,
                    body: format!("{}: {}", msg, body),
                },
                other => other,
            }
        })
    }
}
