//! hotel-scrape CLI
//!
//! Opens a travel site, runs a rule table and prints the hotel record as
//! JSON on stdout. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use hotel_scrape::browser::{BrowserConfig, BrowserController, NavigationOptions};
use hotel_scrape::extraction::{ExtractionResult, FieldExtractor, RuleSet, RunStatus};
use hotel_scrape::page::HtmlPage;
use hotel_scrape::tripadvisor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Extract hotel details from a travel site
#[derive(Parser, Debug)]
#[command(name = "hotel-scrape")]
#[command(version)]
#[command(about = "Extract hotel details with a headless browser")]
struct Args {
    /// Page to open before running the rules
    #[arg(long, default_value = tripadvisor::BASE_URL)]
    url: String,

    /// Hotel to search for
    #[arg(short, long, default_value = tripadvisor::DEFAULT_QUERY)]
    query: String,

    /// JSON rule table replacing the built-in TripAdvisor rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Which search input the built-in rules type into (not used with --rules)
    #[arg(long, default_value_t = tripadvisor::DEFAULT_SEARCH_INDEX, conflicts_with = "rules")]
    search_index: usize,

    /// Per-field wait budget in seconds
    #[arg(short, long, default_value = "10")]
    timeout_secs: u64,

    /// Navigation timeout in seconds
    #[arg(long, default_value = "60")]
    navigation_timeout_secs: u64,

    /// Run against a saved HTML snapshot instead of a browser
    #[arg(long, conflicts_with = "url")]
    html: Option<PathBuf>,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Disable the Chromium sandbox (needed in most containers)
    #[arg(long)]
    no_sandbox: bool,

    /// User agent override
    #[arg(long)]
    user_agent: Option<String>,

    /// Pretty-print the JSON record
    #[arg(long)]
    pretty: bool,

    /// Print the full result (record, errors, status) instead of the record
    #[arg(long)]
    errors: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args).await {
        Ok(result) => match print_result(&result, &args) {
            Ok(()) if result.status == RunStatus::Aborted => ExitCode::from(2),
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<ExtractionResult> {
    let rules = match args.rules {
        Some(ref path) => RuleSet::from_path(path)
            .with_context(|| format!("loading rules from {}", path.display()))?
            .with_query(&args.query),
        None => tripadvisor::rules_with_search_index(&args.query, args.search_index),
    };
    let timeout = Duration::from_secs(args.timeout_secs);

    if let Some(ref snapshot) = args.html {
        let page = HtmlPage::from_path(snapshot)
            .with_context(|| format!("reading snapshot {}", snapshot.display()))?;
        return Ok(FieldExtractor::extract(&page, &rules, timeout).await);
    }

    let mut config = BrowserConfig::builder()
        .headless(!args.headed)
        .sandbox(!args.no_sandbox);
    if let Some(ref path) = args.chrome_path {
        config = config.chrome_path(path);
    }
    if let Some(ref ua) = args.user_agent {
        config = config.user_agent(ua);
    }

    let controller = BrowserController::with_config(config.build())
        .await
        .context("launching browser")?;

    let navigation = NavigationOptions {
        timeout_ms: args.navigation_timeout_secs * 1000,
        ..Default::default()
    };
    let result = match controller.open(&args.url, &navigation).await {
        Ok(page) => Ok(FieldExtractor::extract(&page, &rules, timeout).await),
        Err(e) => Err(anyhow::Error::new(e).context(format!("opening {}", args.url))),
    };

    if let Err(e) = controller.close().await {
        tracing::warn!("Browser did not close cleanly: {}", e);
    }
    result
}

fn print_result(result: &ExtractionResult, args: &Args) -> anyhow::Result<()> {
    let json = match (args.errors, args.pretty) {
        (true, true) => serde_json::to_string_pretty(result)?,
        (true, false) => serde_json::to_string(result)?,
        (false, true) => serde_json::to_string_pretty(&result.record)?,
        (false, false) => serde_json::to_string(&result.record)?,
    };
    println!("{}", json);

    if let Some(terminal) = result.terminal_error() {
        tracing::error!("Extraction aborted at {}", terminal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_search_index_defaults_without_rules() {
        let args = Args::try_parse_from(["hotel-scrape", "--rules", "rules.json"]).unwrap();
        assert_eq!(args.search_index, tripadvisor::DEFAULT_SEARCH_INDEX);

        let args = Args::try_parse_from(["hotel-scrape", "--search-index", "0"]).unwrap();
        assert_eq!(args.search_index, 0);
        assert!(args.rules.is_none());
    }

    #[test]
    fn test_search_index_conflicts_with_rules() {
        let err = Args::try_parse_from([
            "hotel-scrape",
            "--rules",
            "rules.json",
            "--search-index",
            "0",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_snapshot_conflicts_with_url() {
        let err = Args::try_parse_from([
            "hotel-scrape",
            "--html",
            "page.html",
            "--url",
            "https://example.com",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
