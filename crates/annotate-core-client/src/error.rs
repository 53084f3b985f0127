use crate::wire::WireError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by the client API (annotation loading and wire conversion).
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    /// The annotation endpoint could not be reached or returned an error status.
    Http(#[from] Box<ureq::Error>),

    #[error("I/O error: {0}")]
    /// Reading the response body failed.
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    /// The response was not a valid annotation list.
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    /// An annotation record could not be converted for the engine.
    Wire(#[from] WireError),
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        ClientError::Http(Box::new(err))
    }
}
