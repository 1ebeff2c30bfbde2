//! Command handlers for the CLI.
//!
//! Every stage runs to completion before the next starts, and the first error
//! aborts the run without writing anything.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use postmetrics_blog::BlogClient;
use postmetrics_core::{AppConfig, EngagementRow, PostRecord, SinkTarget};
use postmetrics_reactions::{FacebookClient, HatenaClient, ReactionAggregator};
use postmetrics_sink::{
    fetch_sheets_token, load_service_account_key, write_csv, SheetsClient,
};

/// Resolve the collection endpoint and read every post from it.
async fn list_posts(config: &AppConfig) -> anyhow::Result<Vec<PostRecord>> {
    let blog = BlogClient::from_config(config).context("failed to build blog client")?;
    let collection_uri = blog
        .resolve_collection_uri(&config.blog_id)
        .await
        .context("failed to resolve blog collection")?;
    tracing::info!(%collection_uri, "resolved collection");

    let posts = blog
        .fetch_posts(&collection_uri, config.max_feed_pages)
        .await
        .context("failed to read blog posts")?;
    tracing::info!(count = posts.len(), "fetched posts");
    Ok(posts)
}

/// Print `published\turl\ttitle` for every post; absent fields print empty.
pub(crate) async fn run_posts(config: &AppConfig) -> anyhow::Result<()> {
    for post in list_posts(config).await? {
        println!("{}", posts_line(&post));
    }
    Ok(())
}

pub(crate) fn posts_line(post: &PostRecord) -> String {
    format!(
        "{}\t{}\t{}",
        post.published.as_deref().unwrap_or_default(),
        post.url.as_deref().unwrap_or_default(),
        post.title.as_deref().unwrap_or_default(),
    )
}

/// Run the whole pipeline: posts, counts, then the sink.
///
/// `output` overrides the configured sink with a CSV file. The sink and the
/// Graph credentials are checked before any request is made.
///
/// # Errors
///
/// Returns the first failure from any stage, with context naming the stage.
pub(crate) async fn run_collect(config: &AppConfig, output: Option<PathBuf>) -> anyhow::Result<()> {
    let target = sink_target(config, output)?;
    let (client_id, client_secret) = facebook_credentials(config)?;

    let posts = list_posts(config).await?;

    let facebook = FacebookClient::from_config(config).context("failed to build Graph client")?;
    let token = facebook
        .fetch_access_token(client_id, client_secret)
        .await
        .context("failed to obtain Graph access token")?;
    let hatena = HatenaClient::from_config(config).context("failed to build Hatena client")?;

    let aggregator = ReactionAggregator::new(facebook, hatena);
    let rows = aggregator
        .collect(&posts, &token, Utc::now())
        .await
        .context("failed to collect engagement counts")?;

    write_rows(config, &target, &rows).await
}

/// `--output` wins over the configured sink; one of the two must exist.
pub(crate) fn sink_target(
    config: &AppConfig,
    output: Option<PathBuf>,
) -> anyhow::Result<SinkTarget> {
    match (output, &config.sink) {
        (Some(path), _) => Ok(SinkTarget::File { path }),
        (None, Some(sink)) => Ok(sink.clone()),
        (None, None) => Err(anyhow::anyhow!(
            "no output configured; set SPREADSHEET_ID or OUTPUT_FILE_NAME, or pass --output"
        )),
    }
}

pub(crate) fn facebook_credentials(config: &AppConfig) -> anyhow::Result<(&str, &str)> {
    let client_id = config
        .fb_client_id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("FB_CLIENT_ID is not set; cannot run collect"))?;
    let client_secret = config
        .fb_client_secret
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("FB_CLIENT_SECRET is not set; cannot run collect"))?;
    Ok((client_id, client_secret))
}

async fn write_rows(
    config: &AppConfig,
    target: &SinkTarget,
    rows: &[EngagementRow],
) -> anyhow::Result<()> {
    match target {
        SinkTarget::File { path } => {
            write_csv(path, rows)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {} rows to {}", rows.len(), path.display());
        }
        SinkTarget::Spreadsheet {
            credentials_path,
            spreadsheet_id,
            worksheet,
        } => {
            let key = load_service_account_key(credentials_path).with_context(|| {
                format!("failed to load credentials {}", credentials_path.display())
            })?;
            let client = SheetsClient::http_client(config.request_timeout_secs, &config.user_agent)
                .context("failed to build Sheets client")?;
            let token = fetch_sheets_token(&client, &key, Utc::now())
                .await
                .context("failed to obtain Sheets access token")?;
            let sheets = SheetsClient::new(client, &config.endpoints.sheets_base_url, token)
                .context("failed to build Sheets client")?;
            let outcome = sheets
                .append_rows(spreadsheet_id, worksheet, rows)
                .await
                .with_context(|| format!("failed to append to worksheet '{worksheet}'"))?;
            println!(
                "appended {} rows to '{worksheet}' at row {}{}",
                outcome.rows_written,
                outcome.start_row,
                if outcome.header_written {
                    " (with header)"
                } else {
                    ""
                }
            );
        }
    }
    Ok(())
}
