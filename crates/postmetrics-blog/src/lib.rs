//! Hatena Blog AtomPub access: collection discovery and post listing.

pub mod atom;
pub mod client;
pub mod error;

pub use atom::{parse_feed, parse_service_document, FeedPage};
pub use client::BlogClient;
pub use error::BlogError;
