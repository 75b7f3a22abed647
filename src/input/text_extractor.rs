//! Text extraction from various file formats

use crate::error::Result;
use log::warn;
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::panic;
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl PdfExtractor {
    /// Text layer of a PDF, or an empty string when there is none.
    ///
    /// Parser errors and parser panics are both mapped to `""`; callers treat
    /// blank text as an extraction failure.
    pub fn extract_from_bytes(bytes: &[u8]) -> String {
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("Failed to parse PDF: {}", e);
                String::new()
            }
            Err(_) => {
                warn!("PDF parser panicked; treating document as having no text");
                String::new()
            }
        }
    }
}

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Ok(Self::extract_from_bytes(&bytes))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(Self::markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Self::html_to_text(&html_output)
    }

    fn html_to_text(html: &str) -> String {
        // Entities are left for the normalizer to decode
        let text = html
            .replace("<br>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n");

        let tag_regex = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
        let clean_text = tag_regex.replace_all(&text, "");

        clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
