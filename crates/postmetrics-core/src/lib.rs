//! Shared configuration and row types for the postmetrics pipeline.

pub mod app_config;
pub mod config;
pub mod error;
pub mod posts;

pub use app_config::{AppConfig, Endpoints, SinkTarget};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use posts::{format_collected_at, EngagementRow, PostRecord, COLUMNS};
