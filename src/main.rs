mod config;
mod extract;
mod fetch;
mod fingerprint;
mod pipeline;
mod record;
mod snapshot;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::Config;
use pipeline::ScrapeOutcome;
use store::RecordStore;

#[derive(Parser)]
#[command(name = "bday_scraper", about = "School birthday board scraper")]
struct Cli {
    /// Optional TOML config with paths and source URL
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the page once and snapshot the birthday panel if it changed
    Scrape,
    /// Extract all saved snapshots and merge new records into the stores
    Process,
    /// Scrape + process in one pipeline
    Run,
    /// Show store row counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape => {
            report_scrape(pipeline::scrape_once(&cfg).await?);
            Ok(())
        }
        Commands::Process => {
            let outcome = pipeline::process(&cfg)?;
            outcome.print();
            if !outcome.all_ok() {
                anyhow::bail!("One or more stores failed");
            }
            Ok(())
        }
        Commands::Run => {
            report_scrape(pipeline::scrape_once(&cfg).await?);
            let outcome = pipeline::process(&cfg)?;
            outcome.print();
            if !outcome.all_ok() {
                anyhow::bail!("One or more stores failed");
            }
            Ok(())
        }
        Commands::Stats => {
            let mut xlsx = store::XlsxStore::new(&cfg.xlsx_store);
            let mut text = store::TextStore::new(&cfg.text_store);
            println!("xlsx rows:   {}", xlsx.load_existing()?.len());
            println!("text rows:   {}", text.load_existing()?.len());
            println!(
                "fingerprint: {}",
                match fingerprint::load_last(&cfg.fingerprint_file)? {
                    Some(token) => token,
                    None => "(no prior run)".into(),
                }
            );
            Ok(())
        }
    }
}

fn report_scrape(outcome: ScrapeOutcome) {
    match outcome {
        ScrapeOutcome::Saved(path) => println!("New content saved: {}", path.display()),
        ScrapeOutcome::Unchanged => println!("No changes found on the website."),
        ScrapeOutcome::NoPanel => println!("Could not find the birthday panel on the page."),
        ScrapeOutcome::FetchFailed => println!("Request failed; nothing to process this run."),
    }
}
