use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed session state JSON: {0}")]
    Json(#[from] serde_json::Error),
}
