use thiserror::Error;

/// Errors raised by the client UI
#[derive(Debug, Error)]
pub enum UiError {
    #[error("{widget} is already waiting for a response")]
    Busy { widget: &'static str },

    #[error("No key is displayed")]
    NothingToCopy,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server returned {status}: {message}")]
    Rejected { status: u16, message: String },
}
