//! Output formatters: console, JSON, Markdown and CSV

use crate::config::OutputFormat;
use crate::error::{Result, TalentFitError};
use crate::output::report::*;
use colored::{Color, Colorize};
use std::path::Path;

/// Width of the score bar chart in characters
const BAR_WIDTH: usize = 40;

/// Trait for formatting analysis reports
pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
}

/// Console formatter with colors, ranked rows and a bar chart
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Delimited export: one row per category, ranked
pub struct CsvFormatter;

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    csv_formatter: CsvFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn status_color(status: RowStatus) -> Color {
        match status {
            RowStatus::Strong => Color::Green,
            RowStatus::NeedsWork => Color::Yellow,
            RowStatus::NotMentioned => Color::BrightBlack,
        }
    }

    /// `███████░░░░|░░░` with `|` marking the category threshold
    fn score_bar(score: f64, threshold: f64) -> String {
        let filled = ((score / 100.0) * BAR_WIDTH as f64).round() as usize;
        let marker = ((threshold / 100.0) * BAR_WIDTH as f64).round() as usize;

        (0..=BAR_WIDTH)
            .map(|i| {
                if i == marker {
                    '|'
                } else if i < filled {
                    '█'
                } else {
                    '░'
                }
            })
            .collect()
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;

        output.push_str(&self.format_header("📊 CAREER FIT ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Resume: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.resume_file
        ));

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Overall Match: {}\n",
            self.colorize(&format!("{:.2}%", summary.overall_score), Color::Cyan)
        ));
        output.push_str(&format!(
            "Strong Matches: {}/{}\n",
            summary.strong_count, summary.total_categories
        ));
        if let (Some(top), Some(score)) = (&summary.top_category, &summary.top_score) {
            output.push_str(&format!("Top Category: {} ({})\n", top, score));
        }

        output.push_str(&self.format_header("Categories Ranked by Match", 2));
        for row in &report.rows {
            let score_text = match row.score {
                Some(_) => format!("{}%", row.display_score),
                None => row.display_score.clone(),
            };
            output.push_str(&format!(
                "#{} {} → {} [{}]\n",
                row.rank,
                self.colorize(&row.category, Color::White),
                self.colorize(&score_text, Self::status_color(row.status)),
                row.status.label()
            ));
            output.push_str(&format!(
                "   {}\n",
                self.colorize(&row.evidence, Color::BrightBlack)
            ));
        }

        output.push_str(&self.format_header("✅ Key Strengths", 3));
        if summary.strengths.is_empty() {
            output.push_str("  Focus on improvement areas below.\n");
        }
        for row in report.strong_rows() {
            output.push_str(&format!(
                "  • {} → {}%\n    > {}\n",
                self.colorize(&row.category, Color::Green),
                row.display_score,
                row.evidence
            ));
        }

        output.push_str(&self.format_header("🔧 Improvement Areas", 3));
        if summary.improvement_areas.is_empty() {
            output.push_str("  🎉 All categories are at or above their threshold!\n");
        }
        for row in report.improvement_rows() {
            output.push_str(&format!(
                "  • {} → {}\n    > {}\n",
                self.colorize(&row.category, Color::Yellow),
                row.display_score,
                row.suggestion
            ));
        }

        output.push_str(&self.format_header("Match Chart", 3));
        let name_width = report
            .rows
            .iter()
            .map(|r| r.category.chars().count())
            .max()
            .unwrap_or(0);
        for row in &report.rows {
            let bar = Self::score_bar(row.score.unwrap_or(0.0), row.threshold);
            output.push_str(&format!(
                "  {:<width$} {} {:>6.2}\n",
                row.category,
                self.colorize(&bar, Self::status_color(row.status)),
                row.score.unwrap_or(0.0),
                width = name_width
            ));
        }

        if self.detailed {
            output.push_str(&self.format_header("Detailed Breakdown", 2));
            for row in &report.rows {
                output.push_str(&format!(
                    "{} (weight {:.1}, threshold {:.0}%)\n",
                    row.category, row.weight, row.threshold
                ));
                if !row.matched_keywords.is_empty() {
                    output.push_str(&format!(
                        "   Matched: {}\n",
                        row.matched_keywords.join(", ")
                    ));
                }
                output.push_str(&format!("   {}\n", row.suggestion));
            }
        }

        output.push_str(&format!(
            "\n{} Generated by talent-fit v{} | Backend: {}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.version,
            report.metadata.backend
        ));

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;

        output.push_str("# 📊 Career Fit Analysis\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Resume:** `{}` | **Backend:** {}\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.resume_file,
                report.metadata.backend
            ));
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!("**Overall Match:** {:.2}%\n\n", summary.overall_score));
        output.push_str(&format!(
            "**Strong Matches:** {}/{}\n\n",
            summary.strong_count, summary.total_categories
        ));

        output.push_str("## Categories\n\n");
        output.push_str("| # | Category | Match % | Status | Example |\n");
        output.push_str("|---|----------|---------|--------|---------|\n");
        for row in &report.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.rank,
                Self::escape_cell(&row.category),
                row.display_score,
                row.status.label(),
                Self::escape_cell(&row.evidence)
            ));
        }
        output.push('\n');

        output.push_str("### ✅ Key Strengths\n\n");
        if summary.strengths.is_empty() {
            output.push_str("Focus on improvement areas below.\n");
        }
        for row in report.strong_rows() {
            output.push_str(&format!(
                "- **{}** → {}%\n  > {}\n",
                row.category, row.display_score, row.evidence
            ));
        }
        output.push('\n');

        output.push_str("### 🔧 Improvement Areas\n\n");
        if summary.improvement_areas.is_empty() {
            output.push_str("All categories are at or above their threshold.\n");
        }
        for row in report.improvement_rows() {
            output.push_str(&format!(
                "- **{}** → {}\n  > {}\n",
                row.category, row.display_score, row.suggestion
            ));
        }

        if self.include_metadata {
            output.push_str(&format!(
                "\n---\n\n*Generated by talent-fit v{}*\n",
                report.metadata.version
            ));
        }

        Ok(output)
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let to_err = |e: csv::Error| TalentFitError::OutputFormatting(format!("CSV: {}", e));

        writer
            .write_record(["Category", "Match %", "Weight", "Example"])
            .map_err(to_err)?;
        for row in &report.rows {
            let weight = row.weight.to_string();
            writer
                .write_record([
                    row.category.as_str(),
                    row.display_score.as_str(),
                    weight.as_str(),
                    row.evidence.as_str(),
                ])
                .map_err(to_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| TalentFitError::OutputFormatting(format!("CSV: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| TalentFitError::OutputFormatting(format!("CSV is not UTF-8: {}", e)))
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            csv_formatter: CsvFormatter,
        }
    }

    pub fn generate_report(&self, report: &Report, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Csv => self.csv_formatter.format_report(report),
        }
    }

    /// Write the CSV export to `path`
    pub fn export_csv(&self, report: &Report, path: &Path) -> Result<()> {
        let content = self.csv_formatter.format_report(report)?;
        save_report_to_file(&content, path)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::analyzer::aggregate;
    use crate::processing::category_scorer::{
        CategoryResult, CategoryScore, Evidence, ScoreComponents,
    };

    fn sample_report() -> Report {
        let results = vec![
            CategoryResult {
                category: "Training".to_string(),
                weight: 1.5,
                threshold: 70.0,
                score: CategoryScore::Score(82.5),
                evidence: Evidence::Sentence("Led a \"train the trainer\" workshop, twice.".to_string()),
                matched_keywords: vec!["workshop".to_string()],
                missing_keywords: Vec::new(),
                components: ScoreComponents::default(),
            },
            CategoryResult {
                category: "M&A & Due Diligence".to_string(),
                weight: 1.0,
                threshold: 70.0,
                score: CategoryScore::NotMentioned,
                evidence: Evidence::NoExample,
                matched_keywords: Vec::new(),
                missing_keywords: vec!["merger".to_string()],
                components: ScoreComponents::default(),
            },
        ];
        let mut analysis = aggregate(results);
        analysis.backend = "tfidf".to_string();
        Report::from_analysis(&analysis, "cv.pdf")
    }

    #[test]
    fn test_csv_export_quotes_fields() {
        let csv = CsvFormatter.format_report(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Category,Match %,Weight,Example");
        assert_eq!(
            lines[1],
            "Training,82.50,1.5,\"Led a \"\"train the trainer\"\" workshop, twice.\""
        );
        assert_eq!(lines[2], "M&A & Due Diligence,Not mentioned,1,No example in CV");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_console_output_without_colors() {
        let output = ConsoleFormatter::new(false, true)
            .format_report(&sample_report())
            .unwrap();

        assert!(output.contains("Overall Match: 49.50%"));
        assert!(output.contains("Strong Matches: 1/2"));
        assert!(output.contains("#1 Training → 82.50% [Strong]"));
        assert!(output.contains("Consider mentioning: merger"));
        assert!(output.contains("Matched: workshop"));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_score_bar_marks_threshold() {
        let bar = ConsoleFormatter::score_bar(50.0, 70.0);

        assert_eq!(bar.chars().count(), BAR_WIDTH + 1);
        assert_eq!(bar.chars().nth(28), Some('|'));
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 20);
    }

    #[test]
    fn test_json_and_markdown_formats() {
        let generator = ReportGenerator::with_options(false, false);
        let report = sample_report();

        let json = generator.generate_report(&report, &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["overall_score"], 49.5);
        assert_eq!(value["rows"][1]["display_score"], "Not mentioned");

        let markdown = generator
            .generate_report(&report, &OutputFormat::Markdown)
            .unwrap();
        assert!(markdown.contains("| 1 | Training | 82.50 | Strong |"));
    }
}
