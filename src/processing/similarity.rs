//! Pairwise text similarity backends

use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of comparing two texts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// Percentage in [0, 100], rounded to 2 decimals
    Score(f64),
    /// Degenerate input or backend failure
    NotApplicable,
}

impl Similarity {
    pub fn score(&self) -> Option<f64> {
        match self {
            Similarity::Score(s) => Some(*s),
            Similarity::NotApplicable => None,
        }
    }

    /// Build from a cosine in [-1, 1]; non-finite values are not applicable
    pub fn from_cosine(cosine: f64) -> Self {
        if cosine.is_finite() {
            Similarity::Score(round2((cosine * 100.0).clamp(0.0, 100.0)))
        } else {
            Similarity::NotApplicable
        }
    }
}

pub trait SimilarityEngine {
    fn similarity(&self, text_a: &str, text_b: &str) -> Similarity;
    fn name(&self) -> &str;
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// TF-IDF vectors fitted over exactly the two compared documents, compared by cosine.
///
/// No vocabulary survives between calls: idf values only mean something
/// relative to the pair they were fitted on.
pub struct TfIdfSimilarity {
    processor: TextProcessor,
    include_bigrams: bool,
}

impl Default for TfIdfSimilarity {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TfIdfSimilarity {
    pub fn new(include_bigrams: bool) -> Self {
        Self {
            processor: TextProcessor::new(),
            include_bigrams,
        }
    }

    fn term_counts(&self, text: &str) -> HashMap<String, f64> {
        let mut counts = HashMap::new();
        for term in self.processor.terms(text, self.include_bigrams) {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
        counts
    }

    /// Raw counts weighted by smooth idf `ln((1 + n) / (1 + df)) + 1`, L2-normalized
    fn weigh(
        counts: &HashMap<String, f64>,
        document_frequency: &HashMap<&str, usize>,
        n_documents: usize,
    ) -> HashMap<String, f64> {
        let mut vector: HashMap<String, f64> = counts
            .iter()
            .map(|(term, tf)| {
                let df = document_frequency.get(term.as_str()).copied().unwrap_or(1);
                let idf = ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0;
                (term.clone(), tf * idf)
            })
            .collect();

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

impl SimilarityEngine for TfIdfSimilarity {
    fn similarity(&self, text_a: &str, text_b: &str) -> Similarity {
        if text_a.trim().is_empty() || text_b.trim().is_empty() {
            return Similarity::NotApplicable;
        }

        let counts_a = self.term_counts(text_a);
        let counts_b = self.term_counts(text_b);

        match (counts_a.is_empty(), counts_b.is_empty()) {
            (true, true) => return Similarity::NotApplicable,
            (true, false) | (false, true) => return Similarity::Score(0.0),
            _ => {}
        }

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for term in counts_a.keys().chain(counts_b.keys()) {
            *document_frequency.entry(term.as_str()).or_insert(0) += 1;
        }

        let vector_a = Self::weigh(&counts_a, &document_frequency, 2);
        let vector_b = Self::weigh(&counts_b, &document_frequency, 2);

        let cosine: f64 = vector_a
            .iter()
            .filter_map(|(term, wa)| vector_b.get(term).map(|wb| wa * wb))
            .sum();

        Similarity::from_cosine(cosine)
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_maximum() {
        let engine = TfIdfSimilarity::default();
        let text = "compliance training workshop for regional staff";

        assert_eq!(engine.similarity(text, text), Similarity::Score(100.0));
    }

    #[test]
    fn test_self_similarity_dominates() {
        let engine = TfIdfSimilarity::default();
        let a = "risk governance compliance framework";
        let b = "digital automation compliance tooling";

        let self_score = engine.similarity(a, a).score().unwrap();
        let cross_score = engine.similarity(a, b).score().unwrap();

        assert!(self_score >= cross_score);
        assert!(cross_score > 0.0);
        assert!(cross_score < 100.0);
    }

    #[test]
    fn test_disjoint_texts_score_zero() {
        let engine = TfIdfSimilarity::default();

        assert_eq!(
            engine.similarity("merger acquisition", "training workshop"),
            Similarity::Score(0.0)
        );
    }

    #[test]
    fn test_known_cosine_value() {
        let engine = TfIdfSimilarity::default();
        // shared terms get idf 1, "workshop" gets ln(1.5) + 1
        let a = "training workshop compliance";
        let b = "training compliance";

        let idf = (1.5f64).ln() + 1.0;
        let expected = 2.0 / ((2.0 + idf * idf).sqrt() * 2.0f64.sqrt());

        assert_eq!(
            engine.similarity(a, b),
            Similarity::Score(round2(expected * 100.0))
        );
    }

    #[test]
    fn test_degenerate_inputs_not_applicable() {
        let engine = TfIdfSimilarity::default();

        assert_eq!(engine.similarity("", "training"), Similarity::NotApplicable);
        assert_eq!(engine.similarity("training", "   "), Similarity::NotApplicable);
        assert_eq!(engine.similarity("the and of", "it is"), Similarity::NotApplicable);
        assert_eq!(engine.similarity("the and of", "training"), Similarity::Score(0.0));
    }

    #[test]
    fn test_no_state_retained_between_calls() {
        let engine = TfIdfSimilarity::default();
        let first = engine.similarity("audit risk", "audit controls");

        engine.similarity("completely different corpus", "with other vocabulary");

        assert_eq!(engine.similarity("audit risk", "audit controls"), first);
    }

    #[test]
    fn test_bigrams_change_vocabulary() {
        let unigram = TfIdfSimilarity::new(false);
        let bigram = TfIdfSimilarity::new(true);
        let a = "risk governance framework";
        let b = "framework governance risk";

        assert_eq!(unigram.similarity(a, b), Similarity::Score(100.0));
        assert!(bigram.similarity(a, b).score().unwrap() < 100.0);
    }
}
