//! CLI binary for serpkeep.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serpkeep::artifact::parse_header;
use serpkeep::service::Download;
use serpkeep::{AppConfig, SearchService};
use tracing_subscriber::EnvFilter;

/// serpkeep: scrape search results and keep them as text files.
#[derive(Parser)]
#[command(name = "serpkeep", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the web interface.
    Serve,

    /// Run one search, save it, and print the results.
    Search {
        /// The search query.
        query: String,
    },

    /// List recorded searches, newest first.
    History,

    /// Print a stored result file.
    Show {
        /// Artifact file name, as listed by `history`.
        filename: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `search` and `show` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("serpkeep=info,serpkeep_scrape=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let service = Arc::new(SearchService::from_config(&config)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serpkeep::web::serve(service, &config.server).await?,
        Command::Search { query } => run_search(&service, &query).await?,
        Command::History => print_history(&service)?,
        Command::Show { filename } => show(&service, &filename).await?,
    }
    Ok(())
}

/// Explicit path must load; the default path is optional.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    if let Some(path) = path {
        return AppConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()));
    }
    let default = AppConfig::default_config_path();
    if default.exists() {
        AppConfig::from_file(&default)
            .with_context(|| format!("loading config from {}", default.display()))
    } else {
        Ok(AppConfig::default())
    }
}

async fn run_search(service: &SearchService, query: &str) -> anyhow::Result<()> {
    let outcome = service.run_search(query).await?;
    for banner in &outcome.banners {
        eprintln!("[{}] {}", banner.level.as_str(), banner.message);
    }
    for (i, result) in outcome.results.iter().enumerate() {
        println!("{}. {}", i + 1, result.title);
        println!("   {}", result.url);
        if !result.snippet.is_empty() {
            println!("   {}", result.snippet);
        }
    }
    if let Some(artifact) = &outcome.artifact {
        println!("\nSaved as {artifact}");
    }
    Ok(())
}

fn print_history(service: &SearchService) -> anyhow::Result<()> {
    let view = service.recent(usize::MAX)?;
    if view.is_empty() {
        println!("No searches yet.");
    }
    for record in view {
        println!(
            "{}  {:>3} results  {}  ({})",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.result_count,
            record.query,
            record.artifact_key
        );
    }
    Ok(())
}

async fn show(service: &SearchService, filename: &str) -> anyhow::Result<()> {
    let bytes = match service.download(filename).await? {
        Download::Content { bytes, .. } => bytes,
        Download::Redirect(url) => {
            println!("{url}");
            return Ok(());
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    if let Some(header) = parse_header(&text) {
        eprintln!(
            "{} results for \"{}\" via {}",
            header.result_count, header.query, header.engine
        );
    }
    print!("{text}");
    Ok(())
}
