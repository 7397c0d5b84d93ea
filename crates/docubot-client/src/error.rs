use std::path::PathBuf;

use docubot_core::MalformedResult;
use thiserror::Error;

/// Every way a call to the analysis service can fail. All of them are
/// recoverable: the caller reports them and the session carries on.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No usable response: connection refused, reset, timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status, or a `status: "error"` envelope.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("malformed result: {0}")]
    Malformed(#[from] MalformedResult),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network(format!("request timed out: {err}"));
        }
        Self::Network(err.to_string())
    }
}
