//! Post and engagement row types shared by every pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output column names, in the order rows are written.
pub const COLUMNS: [&str; 11] = [
    "timestamp",
    "title",
    "url",
    "published",
    "fb_reaction_count",
    "fb_comment_count",
    "fb_share_count",
    "fb_comment_plugin_count",
    "hatena_bookmark",
    "hatena_star_total",
    "hatena_star_uu",
];

/// One blog post as listed in the collection feed.
///
/// Fields are optional because a feed entry may omit any of them; the
/// aggregator rejects incomplete records before querying counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRecord {
    pub url: Option<String>,
    pub title: Option<String>,
    pub published: Option<String>,
}

/// Engagement counts for one post at collection time.
///
/// Field order and serde names match [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRow {
    #[serde(rename = "timestamp")]
    pub collected_at: String,
    pub title: String,
    pub url: String,
    pub published: String,
    pub fb_reaction_count: u64,
    pub fb_comment_count: u64,
    pub fb_share_count: u64,
    pub fb_comment_plugin_count: u64,
    pub hatena_bookmark: u64,
    pub hatena_star_total: u64,
    pub hatena_star_uu: u64,
}

impl EngagementRow {
    /// Numeric columns in schema order, starting at `fb_reaction_count`.
    #[must_use]
    pub fn counts(&self) -> [u64; 7] {
        [
            self.fb_reaction_count,
            self.fb_comment_count,
            self.fb_share_count,
            self.fb_comment_plugin_count,
            self.hatena_bookmark,
            self.hatena_star_total,
            self.hatena_star_uu,
        ]
    }
}

/// Format the collection timestamp the way it appears in the `timestamp` column.
#[must_use]
pub fn format_collected_at(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn collected_at_uses_second_precision() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_collected_at(at), "2024-03-09 07:05:01");
    }

    #[test]
    fn counts_follow_column_order() {
        let row = EngagementRow {
            collected_at: String::new(),
            title: String::new(),
            url: String::new(),
            published: String::new(),
            fb_reaction_count: 1,
            fb_comment_count: 2,
            fb_share_count: 3,
            fb_comment_plugin_count: 4,
            hatena_bookmark: 5,
            hatena_star_total: 6,
            hatena_star_uu: 7,
        };
        assert_eq!(row.counts(), [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(COLUMNS.len(), 4 + row.counts().len());
        assert_eq!(COLUMNS[4], "fb_reaction_count");
    }
}
