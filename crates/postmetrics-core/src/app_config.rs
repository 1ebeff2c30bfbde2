use std::path::PathBuf;

/// Where the aggregated table ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    /// Overwrite a CSV file at `path`.
    File { path: PathBuf },
    /// Append rows to a worksheet, authenticating with a service-account key.
    Spreadsheet {
        credentials_path: PathBuf,
        spreadsheet_id: String,
        worksheet: String,
    },
}

/// Base URLs of every remote API the pipeline talks to.
///
/// Production values are the public endpoints; tests point them at a local
/// mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub blog_base_url: String,
    pub graph_base_url: String,
    pub bookmark_base_url: String,
    pub star_base_url: String,
    pub sheets_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            blog_base_url: "https://blog.hatena.ne.jp".to_string(),
            graph_base_url: "https://graph.facebook.com".to_string(),
            bookmark_base_url: "https://bookmark.hatenaapis.com".to_string(),
            star_base_url: "https://s.hatena.com".to_string(),
            sheets_base_url: "https://sheets.googleapis.com".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub hatena_id: String,
    pub blog_id: String,
    pub api_key: String,
    /// Needed only by `collect`.
    pub fb_client_id: Option<String>,
    pub fb_client_secret: Option<String>,
    /// `None` when neither `SPREADSHEET_ID` nor `OUTPUT_FILE_NAME` is set.
    pub sink: Option<SinkTarget>,
    pub endpoints: Endpoints,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Number of collection pages to walk via `rel="next"`; `1` reads only the first page.
    pub max_feed_pages: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("hatena_id", &self.hatena_id)
            .field("blog_id", &self.blog_id)
            .field("api_key", &"[redacted]")
            .field("fb_client_id", &self.fb_client_id)
            .field(
                "fb_client_secret",
                &self.fb_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("sink", &self.sink)
            .field("endpoints", &self.endpoints)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_feed_pages", &self.max_feed_pages)
            .finish()
    }
}
