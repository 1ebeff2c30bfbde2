use thiserror::Error;

/// Errors returned by the blog AtomPub client.
#[derive(Debug, Error)]
pub enum BlogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the account id / API key pair.
    #[error("authentication failed ({status}) for {url}")]
    Authentication { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body is not well-formed XML.
    #[error("malformed document from {context}: {reason}")]
    Malformed { context: String, reason: String },

    /// The document parsed but lacks a required element or attribute.
    #[error("{context} is missing {field}")]
    MissingField {
        context: String,
        field: &'static str,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
