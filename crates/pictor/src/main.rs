//! Pictor CLI binary.
//!
//! This binary provides command-line access to the gallery:
//! - Store images with metadata
//! - List, show and delete stored images
//! - Export images as JPEG or PNG

use clap::Parser;
use pictor::{Gallery, PictorConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command};

    // Parse command-line arguments
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let config = match &cli.config {
        Some(path) => PictorConfig::from_file(path)?,
        None => PictorConfig::load()?,
    };

    let logging = if cli.verbose {
        config.logging.clone().with_level("debug")
    } else {
        config.logging.clone()
    };
    init_logging(&logging)?;

    let gallery = Gallery::from_config(&config)?;
    handle_command(cli.command, &gallery, &config).await?;

    let stats = gallery.derivatives().await;
    tracing::debug!(
        tracked = stats.total_tracked,
        scratch_dir = %stats.scratch_dir.display(),
        "Derivative cache at exit"
    );

    Ok(())
}
