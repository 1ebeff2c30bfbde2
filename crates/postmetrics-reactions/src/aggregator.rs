//! Joins the three count sources into one row per post.

use chrono::{DateTime, Utc};

use postmetrics_core::{format_collected_at, EngagementRow, PostRecord};

use crate::error::ReactionError;
use crate::facebook::{AccessToken, FacebookClient};
use crate::hatena::HatenaClient;

pub struct ReactionAggregator {
    facebook: FacebookClient,
    hatena: HatenaClient,
}

impl ReactionAggregator {
    #[must_use]
    pub fn new(facebook: FacebookClient, hatena: HatenaClient) -> Self {
        Self { facebook, hatena }
    }

    /// Collects engagement counts for every post, strictly in input order.
    ///
    /// Each post costs three requests (Graph engagement, bookmark count, star
    /// list), issued one after another. All rows share `collected_at`. The
    /// table is returned only once every post has succeeded.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::IncompletePost`] if a post lacks url, title or
    ///   published; checked before any request for that post.
    /// - The first error from any count lookup; no partial table is returned.
    pub async fn collect(
        &self,
        posts: &[PostRecord],
        token: &AccessToken,
        collected_at: DateTime<Utc>,
    ) -> Result<Vec<EngagementRow>, ReactionError> {
        let collected_at = format_collected_at(collected_at);
        let mut rows = Vec::with_capacity(posts.len());

        for (index, post) in posts.iter().enumerate() {
            let url = required(index, post.url.as_deref(), "url")?;
            let title = required(index, post.title.as_deref(), "title")?;
            let published = required(index, post.published.as_deref(), "published")?;

            let engagement = self.facebook.fetch_engagement(url, token).await?;
            let bookmarks = self.hatena.fetch_bookmark_count(url).await?;
            let stars = self.hatena.fetch_star_summary(url).await?;

            tracing::info!(
                index,
                url,
                reactions = engagement.reaction_count,
                shares = engagement.share_count,
                bookmarks,
                stars = stars.total,
                "collected reactions"
            );

            rows.push(EngagementRow {
                collected_at: collected_at.clone(),
                title: title.to_string(),
                url: url.to_string(),
                published: published.to_string(),
                fb_reaction_count: engagement.reaction_count,
                fb_comment_count: engagement.comment_count,
                fb_share_count: engagement.share_count,
                fb_comment_plugin_count: engagement.comment_plugin_count,
                hatena_bookmark: bookmarks,
                hatena_star_total: stars.total,
                hatena_star_uu: stars.unique_users,
            });
        }

        Ok(rows)
    }
}

fn required<'a>(
    index: usize,
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, ReactionError> {
    value.ok_or(ReactionError::IncompletePost { index, field })
}
