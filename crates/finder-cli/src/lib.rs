//! athlete-finder CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (search, page)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    handle_page, handle_search, resolve_settings, run_page, run_search, Overrides, SearchReport,
};
