//! HTTP client for the Hatena Blog AtomPub API.
//!
//! Every request carries HTTP basic auth (account id + API key). Non-2xx
//! responses become typed errors so the caller never proceeds with a
//! half-resolved collection URI.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use postmetrics_core::{AppConfig, PostRecord};

use crate::atom::{parse_feed, parse_service_document, FeedPage};
use crate::error::BlogError;

/// Client for one Hatena account's AtomPub endpoints.
pub struct BlogClient {
    client: Client,
    base_url: Url,
    hatena_id: String,
    api_key: String,
}

impl BlogClient {
    /// Creates a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`BlogClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, BlogError> {
        Self::with_base_url(
            &config.hatena_id,
            &config.api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.endpoints.blog_base_url,
        )
    }

    /// Creates a client against a custom base URL (a mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`BlogError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        hatena_id: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, BlogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| BlogError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            hatena_id: hatena_id.to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    /// Builds `{base}/{hatena_id}/{blog_id}/atom`.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn service_document_url(&self, blog_id: &str) -> Result<Url, BlogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BlogError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push(&self.hatena_id)
            .push(blog_id)
            .push("atom");
        Ok(url)
    }

    /// Fetches the service document and returns the blog's collection URI.
    ///
    /// # Errors
    ///
    /// - [`BlogError::Authentication`] on 401/403.
    /// - [`BlogError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`BlogError::MissingField`] if the document has no collection href.
    /// - [`BlogError::Http`] on network failure.
    pub async fn resolve_collection_uri(&self, blog_id: &str) -> Result<String, BlogError> {
        let url = self.service_document_url(blog_id)?;
        let body = self.get_text(url).await?;
        let collection_uri = parse_service_document(&body)?;
        tracing::debug!(blog_id, %collection_uri, "resolved collection URI");
        Ok(collection_uri)
    }

    /// Fetches and parses a single collection page.
    ///
    /// # Errors
    ///
    /// Same as [`BlogClient::resolve_collection_uri`], plus
    /// [`BlogError::InvalidUrl`] for an unparseable `uri` and
    /// [`BlogError::Malformed`] for a feed that is not well-formed XML.
    pub async fn fetch_feed(&self, uri: &str) -> Result<FeedPage, BlogError> {
        let url = Url::parse(uri).map_err(|e| BlogError::InvalidUrl {
            url: uri.to_string(),
            reason: e.to_string(),
        })?;
        let body = self.get_text(url).await?;
        parse_feed(&body)
    }

    /// Lists posts from the collection, following `rel="next"` links for at
    /// most `max_pages` pages. Records keep feed order across pages.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`BlogClient::fetch_feed`].
    pub async fn fetch_posts(
        &self,
        collection_uri: &str,
        max_pages: usize,
    ) -> Result<Vec<PostRecord>, BlogError> {
        let mut posts = Vec::new();
        let mut next = Some(collection_uri.to_owned());
        let mut pages = 0usize;

        while let Some(uri) = next.take() {
            if pages >= max_pages {
                tracing::debug!(max_pages, "feed page limit reached");
                break;
            }
            let page = self.fetch_feed(&uri).await?;
            pages += 1;
            tracing::debug!(page = pages, entries = page.posts.len(), "fetched collection page");
            posts.extend(page.posts);
            next = page.next;
        }

        Ok(posts)
    }

    async fn get_text(&self, url: Url) -> Result<String, BlogError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.hatena_id, Some(&self.api_key))
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.text().await?)
    }
}

fn check_status(response: Response) -> Result<Response, BlogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(BlogError::Authentication {
            status: status.as_u16(),
            url,
        })
    } else {
        Err(BlogError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> BlogClient {
        BlogClient::with_base_url("alice", "key", 30, "postmetrics-test/0.1", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn service_document_url_appends_account_and_blog() {
        let client = test_client("https://blog.hatena.ne.jp");
        let url = client.service_document_url("alice.hatenablog.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://blog.hatena.ne.jp/alice/alice.hatenablog.com/atom"
        );
    }

    #[test]
    fn service_document_url_handles_trailing_slash() {
        let client = test_client("http://127.0.0.1:8080/");
        let url = client.service_document_url("b.example").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/alice/b.example/atom");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = BlogClient::with_base_url("alice", "key", 30, "ua", "not a url");
        assert!(matches!(result, Err(BlogError::InvalidUrl { .. })));
    }
}
