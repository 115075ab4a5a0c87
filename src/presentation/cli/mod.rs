use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Blind-vote arena for AI-generated images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Seed prompts and images from a directory tree
    Ingest(IngestCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "IMGARENA_DATABASE_URL",
        default_value = "sqlite://imgarena.db"
    )]
    pub database_url: String,

    #[arg(long, env = "IMGARENA_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    /// Root directory the stored image paths are resolved against
    #[arg(long, env = "IMGARENA_IMAGES_DIR", default_value = "images")]
    pub images_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct IngestCommand {
    #[arg(
        long,
        env = "IMGARENA_DATABASE_URL",
        default_value = "sqlite://imgarena.db"
    )]
    pub database_url: String,

    /// Tree laid out as <prompt-slug>/<ModelName>/<image files>, with the
    /// prompt text in prompt.txt next to the model directories
    #[arg(long, env = "IMGARENA_IMAGES_DIR", default_value = "images")]
    pub images_dir: PathBuf,

    /// Report what would be ingested without writing anything
    #[arg(long)]
    pub dry_run: bool,
}
