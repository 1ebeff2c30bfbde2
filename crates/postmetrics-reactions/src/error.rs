use thiserror::Error;

/// Errors returned while collecting engagement counts.
#[derive(Debug, Error)]
pub enum ReactionError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials or token were rejected.
    #[error("authentication failed ({status}) for {endpoint}")]
    Authentication { status: u16, endpoint: String },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    /// The body decoded but lacks the value we need.
    #[error("response for {context} is missing {field}")]
    MissingField { context: String, field: String },

    /// A post record from the feed lacks a field required for its row.
    #[error("post #{index} has no {field}")]
    IncompletePost { index: usize, field: &'static str },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
