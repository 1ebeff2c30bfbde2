use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod collect;

#[derive(Debug, Parser)]
#[command(name = "postmetrics")]
#[command(about = "Collect social engagement counts for every post of a Hatena blog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every post, look up its counts and write the table.
    Collect {
        /// Write a CSV file here instead of the configured sink.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List the blog's posts without looking up any counts.
    Posts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = postmetrics_core::load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Collect { output }) => collect::run_collect(&config, output).await,
        Some(Commands::Posts) => collect::run_posts(&config).await,
        None => collect::run_collect(&config, None).await,
    }
}
