//! Hatena Bookmark count and Hatena Star lookups.

use std::collections::HashSet;

use reqwest::{Client, Url};

use postmetrics_core::AppConfig;

use crate::error::ReactionError;
use crate::http::{build_client, endpoint, get_json, parse_base_url};
use crate::types::{BookmarkCountResponse, Star, StarResponse};

/// Star totals for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarSummary {
    /// Number of star entries.
    pub total: u64,
    /// Number of distinct users who gave a star.
    pub unique_users: u64,
}

/// Count stars and distinct submitters.
///
/// # Errors
///
/// Returns [`ReactionError::MissingField`] if a star has no `name`.
pub fn summarize_stars(stars: &[Star], context: &str) -> Result<StarSummary, ReactionError> {
    let mut users = HashSet::new();
    for (i, star) in stars.iter().enumerate() {
        let name = star
            .name
            .as_deref()
            .ok_or_else(|| ReactionError::MissingField {
                context: context.to_string(),
                field: format!("stars[{i}].name"),
            })?;
        users.insert(name);
    }
    Ok(StarSummary {
        total: stars.len() as u64,
        unique_users: users.len() as u64,
    })
}

pub struct HatenaClient {
    client: Client,
    bookmark_base_url: Url,
    star_base_url: Url,
}

impl HatenaClient {
    /// # Errors
    ///
    /// See [`HatenaClient::with_base_urls`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ReactionError> {
        Self::with_base_urls(
            config.request_timeout_secs,
            &config.user_agent,
            &config.endpoints.bookmark_base_url,
            &config.endpoints.star_base_url,
        )
    }

    /// # Errors
    ///
    /// Returns [`ReactionError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ReactionError::InvalidUrl`] for an unparseable base URL.
    pub fn with_base_urls(
        timeout_secs: u64,
        user_agent: &str,
        bookmark_base_url: &str,
        star_base_url: &str,
    ) -> Result<Self, ReactionError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            bookmark_base_url: parse_base_url(bookmark_base_url)?,
            star_base_url: parse_base_url(star_base_url)?,
        })
    }

    /// Bookmark count for `url`, read from the value keyed by the URL itself.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::MissingField`] if the response has no key for `url`.
    /// - [`ReactionError::Malformed`] if the value is not a non-negative integer.
    /// - Transport and status errors as in [`crate::FacebookClient`].
    pub async fn fetch_bookmark_count(&self, url: &str) -> Result<u64, ReactionError> {
        let context = format!("bookmark count of {url}");
        let request = endpoint(&self.bookmark_base_url, &["count", "entries"], &[("url", url)])?;
        let response: BookmarkCountResponse = get_json(&self.client, request, &context).await?;
        let value = response
            .get(url)
            .ok_or_else(|| ReactionError::MissingField {
                context: context.clone(),
                field: url.to_string(),
            })?;
        value.as_u64().ok_or_else(|| ReactionError::Malformed {
            context,
            reason: format!("expected a non-negative integer, got {value}"),
        })
    }

    /// Star list of the first entry returned for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ReactionError::MissingField`] if the response has no entry or
    /// the entry has no `stars` list.
    pub async fn fetch_stars(&self, url: &str) -> Result<Vec<Star>, ReactionError> {
        let context = format!("stars of {url}");
        let request = endpoint(&self.star_base_url, &["entry.json"], &[("uri", url)])?;
        let response: StarResponse = get_json(&self.client, request, &context).await?;
        let entry = response
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| ReactionError::MissingField {
                context: context.clone(),
                field: "entries[0]".to_string(),
            })?;
        entry.stars.ok_or(ReactionError::MissingField {
            context,
            field: "entries[0].stars".to_string(),
        })
    }

    /// [`HatenaClient::fetch_stars`] followed by [`summarize_stars`].
    ///
    /// # Errors
    ///
    /// As for those two functions.
    pub async fn fetch_star_summary(&self, url: &str) -> Result<StarSummary, ReactionError> {
        let stars = self.fetch_stars(url).await?;
        summarize_stars(&stars, &format!("stars of {url}"))
    }
}
