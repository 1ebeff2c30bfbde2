use std::path::PathBuf;

use crate::app_config::{AppConfig, Endpoints, SinkTarget};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let hatena_id = require("HATENA_ID")?;
    let blog_id = require("BLOG_ID")?;
    let api_key = require("API_KEY")?;
    let fb_client_id = lookup("FB_CLIENT_ID").ok();
    let fb_client_secret = lookup("FB_CLIENT_SECRET").ok();

    let sink = if let Ok(spreadsheet_id) = lookup("SPREADSHEET_ID") {
        Some(SinkTarget::Spreadsheet {
            credentials_path: PathBuf::from(require("GOOGLE_CREDENTIALS_PATH")?),
            spreadsheet_id,
            worksheet: or_default("WORKSHEET_NAME", "Sheet1"),
        })
    } else {
        lookup("OUTPUT_FILE_NAME").ok().map(|path| SinkTarget::File {
            path: PathBuf::from(path),
        })
    };

    let defaults = Endpoints::default();
    let endpoints = Endpoints {
        blog_base_url: or_default("HATENA_BLOG_BASE_URL", &defaults.blog_base_url),
        graph_base_url: or_default("FB_GRAPH_BASE_URL", &defaults.graph_base_url),
        bookmark_base_url: or_default("HATENA_BOOKMARK_BASE_URL", &defaults.bookmark_base_url),
        star_base_url: or_default("HATENA_STAR_BASE_URL", &defaults.star_base_url),
        sheets_base_url: or_default("SHEETS_BASE_URL", &defaults.sheets_base_url),
    };

    let log_level = or_default("POSTMETRICS_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("POSTMETRICS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("POSTMETRICS_USER_AGENT", "postmetrics/0.1");
    let max_feed_pages = parse_usize("POSTMETRICS_MAX_FEED_PAGES", "1")?;
    if max_feed_pages == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "POSTMETRICS_MAX_FEED_PAGES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        hatena_id,
        blog_id,
        api_key,
        fb_client_id,
        fb_client_secret,
        sink,
        endpoints,
        log_level,
        request_timeout_secs,
        user_agent,
        max_feed_pages,
    })
}
