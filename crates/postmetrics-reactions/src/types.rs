//! Response schemas for the Graph API and Hatena count endpoints.
//!
//! Fields the pipeline depends on are `Option` so that absence is reported as
//! [`crate::ReactionError::MissingField`] naming the key, rather than as a
//! generic decode failure.

use std::collections::HashMap;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Facebook Graph API
// ---------------------------------------------------------------------------

/// `GET /oauth/access_token?grant_type=client_credentials`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// `GET /?id=<url>&fields=og_object{engagement},engagement`
#[derive(Debug, Deserialize)]
pub struct GraphUrlResponse {
    #[serde(default)]
    pub engagement: Option<GraphEngagement>,
}

#[derive(Debug, Deserialize)]
pub struct GraphEngagement {
    #[serde(default)]
    pub reaction_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub share_count: Option<u64>,
    #[serde(default)]
    pub comment_plugin_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// Hatena Bookmark
// ---------------------------------------------------------------------------

/// `GET /count/entries?url=<url>` returns `{ "<url>": <count> }`.
pub type BookmarkCountResponse = HashMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Hatena Star
// ---------------------------------------------------------------------------

/// `GET /entry.json?uri=<url>`
#[derive(Debug, Deserialize)]
pub struct StarResponse {
    #[serde(default)]
    pub entries: Vec<StarEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StarEntry {
    #[serde(default)]
    pub stars: Option<Vec<Star>>,
}

/// One star; `name` is the Hatena ID of the user who gave it.
#[derive(Debug, Clone, Deserialize)]
pub struct Star {
    #[serde(default)]
    pub name: Option<String>,
}
