//! Game portal command line entry point.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portal_catalog::CatalogClient;
use portal_render::PageQuery;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::commands::Page;
use crate::config::PortalConfig;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config path).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the home page.
    Home {
        /// Page query string, e.g. `channel=abc`.
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Render a category page.
    Category {
        #[arg(long)]
        query: String,
    },
    /// Render a game detail page.
    Detail {
        #[arg(long)]
        query: String,
    },
    /// Decide where a game's play button leads.
    Play {
        #[arg(long)]
        query: String,
    },
    /// Pick a legible text colour for a background.
    Contrast {
        /// `#rgb` or `#rrggbb`; defaults to the configured theme background.
        color: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Home { query } => render(Page::Home, &query, &config).await,
        Command::Category { query } => render(Page::Category, &query, &config).await,
        Command::Detail { query } => render(Page::Detail, &query, &config).await,
        Command::Play { query } => {
            let outcome = commands::play(&PageQuery::parse(&query), &config).await?;
            print_json(&outcome)
        }
        Command::Contrast { color } => {
            let background = color.as_deref().unwrap_or(&config.theme_background);
            print_json(&commands::contrast(background)?)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> PortalConfig {
    let loaded = match path {
        Some(path) => PortalConfig::load_from(path),
        None => PortalConfig::load(),
    };

    match loaded {
        Ok(c) => {
            tracing::debug!(catalog_url = %c.catalog_url, "configuration loaded");
            c
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            PortalConfig::default()
        }
    }
}

async fn render(page: Page, query: &str, config: &PortalConfig) -> anyhow::Result<()> {
    let query = PageQuery::parse(query);
    let client = CatalogClient::http(config.catalog_url.as_str())?;
    let catalog = client.fetch().await;

    let json = commands::render_page(page, &catalog, &query, config, &mut rand::thread_rng())?;
    print_json(&json)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
