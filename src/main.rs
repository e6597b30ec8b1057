use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use std::path::PathBuf;

use blog_notifier::config::Config;
use blog_notifier::run::{run_once, FetchOutcome};
use blog_notifier::storage::{Database, DatabaseError};

/// Get the config directory path (~/.config/blog-notifier/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("blog-notifier"))
}

#[derive(Parser, Debug)]
#[command(
    name = "blog-notifier",
    about = "Scrape a blog listing and post unread articles to a chat webhook"
)]
struct Args {
    /// Config file (default: ~/.config/blog-notifier/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides `database_path` from the config)
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config_dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let settings = config.settings().context("Invalid configuration")?;

    let db_path = args
        .database
        .unwrap_or_else(|| config.database_path(&config_dir));
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!("Error: Another instance of blog-notifier appears to be running.");
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let client = settings
        .http_client()
        .context("Failed to build HTTP client")?;

    let report = run_once(&db, &client, &settings, Local::now().weekday())
        .await
        .context("Run failed")?;

    if let FetchOutcome::Aborted(status) = report.fetch {
        tracing::warn!(status = status, "Listing was not fetched this run");
    }
    tracing::info!(
        delivered = report.notify.delivered,
        failed = report.notify.failed,
        remaining = report.notify.remaining,
        "Run complete"
    );

    println!("finish");
    Ok(())
}
