//! CLI interface for the career fit analyzer

use crate::config::{OutputFormat, SimilarityBackend};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "talent-fit")]
#[command(about = "Career fit analyzer: score a resume against a job description")]
#[command(long_about = "Score how well a resume matches a job description per keyword category, \
highlight strengths and gaps, and export the results as CSV")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume against the configured job description
    Analyze {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job description file (TXT, MD) to use instead of the configured one
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Output format: console, json, markdown, csv
        #[arg(short, long)]
        format: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Write the CSV export (defaults to cv_analysis.csv)
        #[arg(short, long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,

        /// Similarity backend: tfidf, embedding
        #[arg(short, long)]
        backend: Option<String>,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the configured categories
    Categories,

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, csv",
            format
        )),
    }
}

pub fn parse_backend(backend: &str) -> Result<SimilarityBackend, String> {
    match backend.to_lowercase().as_str() {
        "tfidf" | "tf-idf" => Ok(SimilarityBackend::TfIdf),
        "embedding" | "embeddings" => Ok(SimilarityBackend::Embedding),
        _ => Err(format!(
            "Invalid backend: {}. Supported: tfidf, embedding",
            backend
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
