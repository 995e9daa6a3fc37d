//! CLI argument parsing for athlete-finder.
//!
//! Flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Athlete Finder
///
/// Incremental search over a paginated athlete directory.
#[derive(Parser, Debug)]
#[command(name = "athlete-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/athlete-finder/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Finder commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search athletes by name, location or club
    Search {
        /// Query text (at least two characters)
        query: String,

        /// Override the listing endpoint
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Override records per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch and print one normalized page
    Page {
        /// Override the listing endpoint
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Override records per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search() {
        let cli = Cli::parse_from(["athlete-finder", "search", "ana"]);
        match cli.command {
            Commands::Search {
                query,
                endpoint,
                page_size,
                json,
            } => {
                assert_eq!(query, "ana");
                assert!(endpoint.is_none());
                assert!(page_size.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_with_overrides() {
        let cli = Cli::parse_from([
            "athlete-finder",
            "search",
            "porto",
            "-e",
            "http://localhost:9000/athletes",
            "--page-size",
            "20",
            "--json",
        ]);
        match cli.command {
            Commands::Search {
                endpoint,
                page_size,
                json,
                ..
            } => {
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000/athletes"));
                assert_eq!(page_size, Some(20));
                assert!(json);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_page_defaults_to_first() {
        let cli = Cli::parse_from(["athlete-finder", "page"]);
        match cli.command {
            Commands::Page { page, .. } => assert_eq!(page, 0),
            _ => panic!("Expected Page command"),
        }
    }

    #[test]
    fn test_cli_page_index() {
        let cli = Cli::parse_from(["athlete-finder", "page", "--page", "3"]);
        assert!(matches!(cli.command, Commands::Page { page: 3, .. }));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "athlete-finder",
            "search",
            "ana",
            "--config",
            "/path/to/config.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_search_requires_query() {
        assert!(Cli::try_parse_from(["athlete-finder", "search"]).is_err());
    }
}
