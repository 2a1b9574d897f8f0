use anyhow::Context;
use clap::{Parser, Subcommand};
use property_search::{
    config::Config,
    loader::{CsvDataSource, LoadOrchestrator, LoadOutcome},
    search::IndexSchema,
    state::create_store,
    telemetry::init_tracing,
};
use reqwest::{Client, Response};
use serde_json::json;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "property-search-cli")]
#[command(about = "Property availability search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "PROPSEARCH_ENDPOINT", default_value = "http://localhost:8000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog load in the foreground against the configured store
    Load,

    /// Check whether the server has finished loading
    Status,

    /// Search for available properties
    Search {
        #[arg(short = 't', long = "type")]
        property_type: String,

        #[arg(short, long)]
        zip: String,

        /// Radius in miles
        #[arg(short, long)]
        radius: f64,

        /// Window start, unix seconds
        #[arg(short, long)]
        begin: i64,

        /// Window end, unix seconds
        #[arg(short, long)]
        end: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Load => run_load().await?,

        Commands::Status => {
            let response = Client::new()
                .get(format!("{}/health/ready", cli.endpoint))
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;
            print_response(response).await?;
        }

        Commands::Search {
            property_type,
            zip,
            radius,
            begin,
            end,
        } => {
            let response = Client::new()
                .post(format!("{}/property/search", cli.endpoint))
                .json(&json!({
                    "type": property_type,
                    "zip": zip,
                    "radius": radius,
                    "begin": begin,
                    "end": end,
                }))
                .send()
                .await
                .with_context(|| format!("failed to reach {}", cli.endpoint))?;
            print_response(response).await?;
        }
    }

    Ok(())
}

async fn run_load() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.observability);

    let store = create_store(&config.store).await?;
    let source = Arc::new(CsvDataSource::new(
        &config.loader.zip_csv_path,
        &config.loader.address_csv_path,
    ));
    let orchestrator = LoadOrchestrator::new(
        store,
        source,
        IndexSchema::property_index(&config.store.index_name),
        config.loader.clone(),
    );

    match orchestrator.run().await? {
        LoadOutcome::AlreadyComplete => println!("Catalog already loaded"),
        LoadOutcome::Loaded(summary) => println!(
            "Loaded {} zips and {} properties in {:.2}s",
            summary.zips,
            summary.properties,
            summary.elapsed_ms as f64 / 1000.0
        ),
    }

    Ok(())
}

/// Pretty-print JSON bodies; fall back to raw text for plain responses
async fn print_response(response: Response) -> anyhow::Result<()> {
    let status = response.status();
    let text = response.text().await?;

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        anyhow::bail!("server responded with {}", status);
    }
    Ok(())
}
