use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ReactionError;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ReactionError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ReactionError> {
    Url::parse(base_url).map_err(|e| ReactionError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Append `path` to `base` and set the query pairs, percent-encoding values.
pub(crate) fn endpoint(
    base: &Url,
    path: &[&str],
    query: &[(&str, &str)],
) -> Result<Url, ReactionError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ReactionError::InvalidUrl {
                url: base.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?;
        segments.pop_if_empty();
        for segment in path {
            segments.push(segment);
        }
    }
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// The URL without its query string; query values may carry secrets.
pub(crate) fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Sends a GET, asserts a 2xx status, and decodes the body as `T`.
///
/// # Errors
///
/// - [`ReactionError::Authentication`] on 401/403.
/// - [`ReactionError::UnexpectedStatus`] on other non-2xx statuses.
/// - [`ReactionError::Http`] on network failure, with the URL stripped.
/// - [`ReactionError::Malformed`] if the body does not decode.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    context: &str,
) -> Result<T, ReactionError> {
    let endpoint = redacted(&url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(reqwest::Error::without_url)?;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ReactionError::Authentication {
            status: status.as_u16(),
            endpoint,
        });
    }
    if !status.is_success() {
        return Err(ReactionError::UnexpectedStatus {
            status: status.as_u16(),
            endpoint,
        });
    }
    let body = response.text().await.map_err(reqwest::Error::without_url)?;
    serde_json::from_str(&body).map_err(|e| ReactionError::Malformed {
        context: context.to_string(),
        reason: e.to_string(),
    })
}
