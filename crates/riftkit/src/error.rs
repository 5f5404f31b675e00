use std::borrow::Borrow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Lockfile missing, connection refused, timeout or any other transport
    /// failure while talking to the local client.
    #[error("Game client unavailable: {0}")]
    PeerUnavailable(String),

    #[error("Request rejected with status {status}: {body}")]
    RequestRejected { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid lockfile: {0}")]
    InvalidLockfile(String),

    /// Transport failure (refused, reset, timeout) talking to a public
    /// service.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transcoder failed{}: {message}", exit_suffix(.code))]
    Transcode { code: Option<i32>, message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn exit_suffix<C: Borrow<Option<i32>>>(code: C) -> String {
    code.borrow()
        .map(|c| format!(" (exit code {})", c))
        .unwrap_or_default()
}

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the caller should try again later rather than stop and report.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::PeerUnavailable(_) | Error::Network(_))
    }
}
