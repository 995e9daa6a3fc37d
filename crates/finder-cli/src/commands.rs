//! Command implementations.
//!
//! Settings are resolved in order: defaults, config file, `FINDER_*`
//! environment, then CLI flags.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use finder_core::{RecordingObserver, ScanConditions, ScanOutcome, SearchSession};
use finder_fetch::{HttpRecordSource, HttpSourceConfig, Page, PageFetcher};
use finder_types::{CanonicalRecord, Settings};

/// Flag overrides shared by every command.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub page_size: Option<u32>,
    pub log_level: Option<String>,
}

/// Result of a `search` run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub query: String,
    pub outcome: ScanOutcome,
    pub matches: Vec<CanonicalRecord>,
    pub errors: Vec<String>,
}

/// Load settings and apply flag overrides.
pub fn resolve_settings(config_path: Option<&str>, overrides: &Overrides) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(endpoint) = &overrides.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(page_size) = overrides.page_size {
        settings.page_size = page_size;
    }
    if let Some(log_level) = &overrides.log_level {
        settings.log_level = log_level.clone();
    }

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

fn init_tracing(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn http_fetcher(settings: &Settings) -> Result<PageFetcher<HttpRecordSource>> {
    let source = HttpRecordSource::new(HttpSourceConfig::from_settings(settings))
        .context("Failed to build HTTP client")?;
    Ok(PageFetcher::from_settings(Arc::new(source), settings))
}

/// Open a session, run the keystroke path for `query`, collect the result.
///
/// Fetch failures do not fail the run; they are returned in `errors`.
pub async fn run_search(settings: &Settings, query: &str) -> Result<SearchReport> {
    let observer = Arc::new(RecordingObserver::default());
    let session = SearchSession::new(
        http_fetcher(settings)?,
        ScanConditions::from_settings(settings),
        observer.clone(),
    );

    session.open().await;
    let outcome = session.search(query).await;
    let matches = session.matches();
    session.close();

    Ok(SearchReport {
        query: query.to_string(),
        outcome,
        matches,
        errors: observer.errors(),
    })
}

/// Fetch one normalized page.
pub async fn run_page(settings: &Settings, page_index: u32) -> Result<Page> {
    let fetcher = http_fetcher(settings)?;
    fetcher
        .fetch_page(page_index, settings.page_size)
        .await
        .with_context(|| format!("Failed to fetch page {}", page_index))
}

/// `search` command.
pub async fn handle_search(
    config_path: Option<&str>,
    overrides: Overrides,
    query: &str,
    json: bool,
) -> Result<()> {
    let settings = resolve_settings(config_path, &overrides)?;
    init_tracing(&settings)?;
    info!(endpoint = %settings.endpoint, query, "Searching");

    let report = run_search(&settings, query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for error in &report.errors {
        println!("Error: {}", error);
    }
    print_records(&report.matches);
    println!();
    println!("{}", report.outcome.explanation());
    Ok(())
}

/// `page` command.
pub async fn handle_page(
    config_path: Option<&str>,
    overrides: Overrides,
    page_index: u32,
    json: bool,
) -> Result<()> {
    let settings = resolve_settings(config_path, &overrides)?;
    init_tracing(&settings)?;

    let page = run_page(&settings, page_index).await?;

    if json {
        let body = serde_json::json!({
            "page": page_index,
            "hasMore": page.has_more,
            "rawCount": page.raw_count,
            "records": page.records,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_records(&page.records);
    println!();
    println!(
        "Page {}: {} of {} record(s) usable, more pages: {}",
        page_index,
        page.records.len(),
        page.raw_count,
        if page.has_more { "yes" } else { "no" }
    );
    Ok(())
}

fn print_records(records: &[CanonicalRecord]) {
    if records.is_empty() {
        println!("No athletes found.");
        return;
    }

    println!("{:<12} {:<28} {:<20} CLUB", "ID", "NAME", "LOCATION");
    for record in records {
        println!(
            "{:<12} {:<28} {:<20} {}",
            record.id.as_str(),
            truncate(&record.display_name, 28),
            truncate(record.location_label.as_deref().unwrap_or("-"), 20),
            record.affiliation_label.as_deref().unwrap_or("-")
        );
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Ana", 10), "Ana");
        assert_eq!(truncate("Maria Fernanda Oliveira", 10), "Maria F...");
        assert_eq!(truncate("Élodie Ménard", 8), "Élodi...");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "endpoint = \"http://file.example/athletes\"").unwrap();
        writeln!(file, "page_size = 25").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let from_file = resolve_settings(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(from_file.endpoint, "http://file.example/athletes");
        assert_eq!(from_file.page_size, 25);

        let overrides = Overrides {
            endpoint: Some("http://flag.example/athletes".to_string()),
            page_size: Some(10),
            log_level: Some("debug".to_string()),
        };
        let settings = resolve_settings(Some(&path), &overrides).unwrap();
        assert_eq!(settings.endpoint, "http://flag.example/athletes");
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let overrides = Overrides {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(resolve_settings(None, &overrides).is_err());
    }
}
