//! Configuration management for the career fit analyzer

use crate::error::{Result, TalentFitError};
use crate::processing::categories::{default_categories, validate_categories, CategoryDefinition};
use crate::processing::category_scorer::ScoringPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Job description scored against when none is supplied on the command line
pub const DEFAULT_JOB_DESCRIPTION: &str = "Do you want to help create the future of healthcare? \
Our name was selected to honor our people who dedicate their energy and passion to this cause. \
It reflects their pioneering spirit combined with our long history of engineering in the \
ever-evolving healthcare industry.\n\n\
Responsibilities include driving compliance and risk governance, supporting digitalization \
initiatives, contributing to M&A due diligence, enabling global collaboration, leading project \
management activities, delivering training programs, and applying regulatory knowledge across \
medtech contexts.";

/// Fixed name of the CSV export
pub const DEFAULT_EXPORT_FILENAME: &str = "cv_analysis.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub job: JobConfig,
    pub scoring: ScoringPolicy,
    pub similarity: SimilarityConfig,
    pub output: OutputConfig,
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub backend: SimilarityBackend,
    pub include_bigrams: bool,
    /// Local model directory or Hugging Face hub id
    pub embedding_model: String,
    pub embedding_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimilarityBackend {
    #[serde(rename = "tfidf")]
    TfIdf,
    #[serde(rename = "embedding")]
    Embedding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
    pub export_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job: JobConfig::default(),
            scoring: ScoringPolicy::default(),
            similarity: SimilarityConfig::default(),
            output: OutputConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_JOB_DESCRIPTION.to_string(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            backend: SimilarityBackend::TfIdf,
            include_bigrams: false,
            embedding_model: "minishlab/potion-base-8M".to_string(),
            embedding_timeout_secs: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

impl Config {
    /// Load from the user config directory, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            TalentFitError::Configuration(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            TalentFitError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overwrite the stored configuration with defaults
    pub fn reset() -> Result<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("talent-fit")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.job.description.trim().is_empty() {
            return Err(TalentFitError::Configuration(
                "Job description must not be empty".to_string(),
            ));
        }

        if self.similarity.embedding_timeout_secs == 0 {
            return Err(TalentFitError::Configuration(
                "embedding_timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.output.export_filename.trim().is_empty() {
            return Err(TalentFitError::Configuration(
                "export_filename must not be empty".to_string(),
            ));
        }

        self.scoring.validate()?;
        validate_categories(&self.categories)
    }
}
