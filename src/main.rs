use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use imgarena::application::{ServerConfig, serve};
use imgarena::infrastructure::database::Database;
use imgarena::infrastructure::ingest::Ingestor;
use imgarena::infrastructure::repositories::images::SqlImageRepository;
use imgarena::infrastructure::repositories::prompts::SqlPromptRepository;
use imgarena::presentation::cli::{Cli, Commands, IngestCommand, ServeCommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Ingest(cmd) => run_ingest(cmd).await,
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        images_dir: command.images_dir,
    };

    serve(config).await
}

async fn run_ingest(command: IngestCommand) -> Result<()> {
    let database = Database::connect(&command.database_url).await?;
    let pool = database.clone_pool();

    let ingestor = Ingestor::new(
        Arc::new(SqlPromptRepository::new(pool.clone())),
        Arc::new(SqlImageRepository::new(pool)),
    );

    let report = ingestor
        .ingest_tree(&command.images_dir, command.dry_run)
        .await?;

    println!(
        "{} prompts, {} images ingested ({} already present)",
        report.prompts_created,
        report.images_created,
        report.skipped_slugs.len()
    );

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
