//! Facebook Graph API: app token exchange and per-URL engagement.

use reqwest::{Client, Url};

use postmetrics_core::AppConfig;

use crate::error::ReactionError;
use crate::http::{build_client, endpoint, get_json, parse_base_url};
use crate::types::{GraphEngagement, GraphUrlResponse, TokenResponse};

const ENGAGEMENT_FIELDS: &str = "og_object{engagement},engagement";

/// Short-lived app access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Engagement counters for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementCounts {
    pub reaction_count: u64,
    pub comment_count: u64,
    pub share_count: u64,
    pub comment_plugin_count: u64,
}

pub struct FacebookClient {
    client: Client,
    base_url: Url,
}

impl FacebookClient {
    /// # Errors
    ///
    /// See [`FacebookClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ReactionError> {
        Self::with_base_url(
            config.request_timeout_secs,
            &config.user_agent,
            &config.endpoints.graph_base_url,
        )
    }

    /// Creates a client against a custom Graph API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReactionError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ReactionError::InvalidUrl`] for an unparseable base URL.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ReactionError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Exchanges app credentials for an access token (client-credentials grant).
    ///
    /// # Errors
    ///
    /// - [`ReactionError::MissingField`] if the response has no `access_token`.
    /// - [`ReactionError::Authentication`] / [`ReactionError::UnexpectedStatus`]
    ///   on a non-2xx status.
    /// - [`ReactionError::Http`] / [`ReactionError::Malformed`] on transport
    ///   or decode failure.
    pub async fn fetch_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, ReactionError> {
        const CONTEXT: &str = "oauth/access_token";

        let url = endpoint(
            &self.base_url,
            &["oauth", "access_token"],
            &[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ],
        )?;
        let response: TokenResponse = get_json(&self.client, url, CONTEXT).await?;
        let token = response
            .access_token
            .ok_or_else(|| missing(CONTEXT, "access_token"))?;
        tracing::debug!(token_type = ?response.token_type, "acquired Graph API token");
        Ok(AccessToken(token))
    }

    /// Fetches the `engagement` object for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ReactionError::MissingField`] if `engagement` or any of its
    /// four counters is absent; otherwise as [`FacebookClient::fetch_access_token`].
    pub async fn fetch_engagement(
        &self,
        url: &str,
        token: &AccessToken,
    ) -> Result<EngagementCounts, ReactionError> {
        let context = format!("engagement of {url}");
        let request = endpoint(
            &self.base_url,
            &[],
            &[
                ("id", url),
                ("fields", ENGAGEMENT_FIELDS),
                ("access_token", token.as_str()),
            ],
        )?;
        let response: GraphUrlResponse = get_json(&self.client, request, &context).await?;
        let engagement = response
            .engagement
            .ok_or_else(|| missing(&context, "engagement"))?;
        extract_counts(&engagement, &context)
    }
}

fn extract_counts(
    engagement: &GraphEngagement,
    context: &str,
) -> Result<EngagementCounts, ReactionError> {
    let field = |value: Option<u64>, name: &str| value.ok_or_else(|| missing(context, name));
    Ok(EngagementCounts {
        reaction_count: field(engagement.reaction_count, "engagement.reaction_count")?,
        comment_count: field(engagement.comment_count, "engagement.comment_count")?,
        share_count: field(engagement.share_count, "engagement.share_count")?,
        comment_plugin_count: field(
            engagement.comment_plugin_count,
            "engagement.comment_plugin_count",
        )?,
    })
}

fn missing(context: &str, field: &str) -> ReactionError {
    ReactionError::MissingField {
        context: context.to_string(),
        field: field.to_string(),
    }
}
