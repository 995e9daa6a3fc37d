//! Athlete Finder
//!
//! Incremental search over a paginated athlete directory.
//!
//! # Usage
//!
//! ```bash
//! athlete-finder search <QUERY> [--endpoint URL] [--page-size N] [--json]
//! athlete-finder page [--page N] [--endpoint URL] [--page-size N] [--json]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/athlete-finder/config.toml)
//! 3. Environment variables (FINDER_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use finder_cli::{handle_page, handle_search, Cli, Commands, Overrides};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            query,
            endpoint,
            page_size,
            json,
        } => {
            let overrides = Overrides {
                endpoint,
                page_size,
                log_level: cli.log_level,
            };
            handle_search(cli.config.as_deref(), overrides, &query, json).await?;
        }
        Commands::Page {
            endpoint,
            page,
            page_size,
            json,
        } => {
            let overrides = Overrides {
                endpoint,
                page_size,
                log_level: cli.log_level,
            };
            handle_page(cli.config.as_deref(), overrides, page, json).await?;
        }
    }

    Ok(())
}
