//! Social engagement lookups for blog posts.
//!
//! Exchanges Facebook app credentials for a token, then joins Graph API
//! engagement, Hatena Bookmark counts and Hatena Star lists into one
//! [`postmetrics_core::EngagementRow`] per post.

pub mod aggregator;
pub mod error;
pub mod facebook;
pub mod hatena;
pub mod types;

mod http;

pub use aggregator::ReactionAggregator;
pub use error::ReactionError;
pub use facebook::{AccessToken, EngagementCounts, FacebookClient};
pub use hatena::{summarize_stars, HatenaClient, StarSummary};
