//! Report structures derived from an analysis run

use crate::processing::analyzer::AnalysisResult;
use crate::processing::category_scorer::{CategoryResult, CategoryScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type of the downloadable export
pub const CSV_MIME_TYPE: &str = "text/csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub rank: usize,
    pub category: String,
    /// Numeric score, absent for "not mentioned" and "not applicable"
    pub score: Option<f64>,
    /// Percentage, "Not mentioned" or "N/A"
    pub display_score: String,
    pub weight: f64,
    pub threshold: f64,
    pub status: RowStatus,
    pub evidence: String,
    pub suggestion: String,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RowStatus {
    Strong,
    NeedsWork,
    NotMentioned,
}

impl RowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Strong => "Strong",
            RowStatus::NeedsWork => "Needs work",
            RowStatus::NotMentioned => "Not mentioned",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub overall_score: f64,
    pub strong_count: usize,
    pub total_categories: usize,
    pub top_category: Option<String>,
    pub top_score: Option<String>,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub resume_file: String,
    pub backend: String,
    /// Media type of the CSV export, for callers serving it as a download
    pub export_mime_type: String,
}

impl Report {
    pub fn from_analysis(analysis: &AnalysisResult, resume_file: &str) -> Self {
        let rows: Vec<ReportRow> = analysis
            .results
            .iter()
            .enumerate()
            .map(|(i, result)| ReportRow::from_result(i + 1, result))
            .collect();

        let top = analysis.top_category();

        let summary = ReportSummary {
            overall_score: analysis.overall_score,
            strong_count: analysis.strong_count(),
            total_categories: rows.len(),
            top_category: top.map(|r| r.category.clone()),
            top_score: top.map(|r| r.score.to_string()),
            strengths: analysis.strong.clone(),
            improvement_areas: analysis.needs_improvement.clone(),
        };

        Self {
            rows,
            summary,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                resume_file: resume_file.to_string(),
                backend: analysis.backend.clone(),
                export_mime_type: CSV_MIME_TYPE.to_string(),
            },
        }
    }

    pub fn strong_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.status == RowStatus::Strong)
    }

    pub fn improvement_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.status != RowStatus::Strong)
    }
}

impl ReportRow {
    fn from_result(rank: usize, result: &CategoryResult) -> Self {
        let status = if matches!(result.score, CategoryScore::NotMentioned) {
            RowStatus::NotMentioned
        } else if result.is_strong() {
            RowStatus::Strong
        } else {
            RowStatus::NeedsWork
        };

        let suggestion = if result.missing_keywords.is_empty() {
            "Add relevant experience.".to_string()
        } else {
            format!("Consider mentioning: {}", result.missing_keywords.join(", "))
        };

        let display_score = match result.score {
            CategoryScore::Score(s) => format!("{:.2}", s),
            other => other.to_string(),
        };

        Self {
            rank,
            category: result.category.clone(),
            score: (!result.score.is_sentinel()).then(|| result.score.numeric()),
            display_score,
            weight: result.weight,
            threshold: result.threshold,
            status,
            evidence: result.evidence.as_str().to_string(),
            suggestion,
            matched_keywords: result.matched_keywords.clone(),
        }
    }
}
