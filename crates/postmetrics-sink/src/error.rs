use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The service-account key file is unreadable or incomplete.
    #[error("invalid service account credentials at {path}: {reason}")]
    Credentials { path: PathBuf, reason: String },

    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed ({status}) for {endpoint}")]
    Authentication { status: u16, endpoint: String },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("malformed response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    #[error("response for {context} is missing {field}")]
    MissingField {
        context: String,
        field: &'static str,
    },

    #[error("column number {0} has no letter form")]
    InvalidColumn(u32),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
