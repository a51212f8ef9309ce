//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pictor - local image gallery with expiring JPEG/PNG exports
#[derive(Parser, Debug)]
#[command(name = "pictor")]
#[command(about = "Local image gallery with expiring JPEG/PNG exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move an image into the gallery and record its metadata
    Store {
        /// Image file to store (removed once copied)
        file: PathBuf,

        /// Prompt the image was generated from
        #[arg(long)]
        prompt: Option<String>,

        /// Model that generated the image (requires --prompt)
        #[arg(long, requires = "prompt")]
        model: Option<String>,

        /// Extra metadata as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// List stored images, newest first
    List {
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,

        /// Records per page (defaults to gallery.per_page)
        #[arg(long)]
        per_page: Option<usize>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the metadata for an image
    Show {
        /// Image identifier
        id: String,
    },

    /// Delete an image and its metadata
    Delete {
        /// Image identifier
        id: String,
    },

    /// Export an image as JPEG or PNG
    Convert {
        /// Image identifier
        id: String,

        /// Target format: jpg or png
        format: String,

        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,

        /// Copy the export here instead of leaving it in the scratch directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Output format for list results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Human,
    /// The page as JSON
    Json,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
