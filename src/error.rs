//! Error handling for the career fit analyzer

use thiserror::Error;

/// Shown to the user whenever a document yields no usable text.
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "No text could be extracted from the document. Please upload a text-based (non-scanned) PDF.";

#[derive(Error, Debug)]
pub enum TalentFitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No text could be extracted from the document. Please upload a text-based (non-scanned) PDF. ({0})")]
    ExtractionFailed(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Embedding backend error: {0}")]
    Embedding(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl TalentFitError {
    /// True for failures the user can fix by supplying a different document.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, TalentFitError::ExtractionFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, TalentFitError>;

/// The Model2Vec loader reports through anyhow
impl From<anyhow::Error> for TalentFitError {
    fn from(err: anyhow::Error) -> Self {
        TalentFitError::Embedding(err.to_string())
    }
}
