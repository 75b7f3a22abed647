//! Hybrid keyword / similarity scoring of a single category

use crate::error::{Result, TalentFitError};
use crate::processing::categories::{CategoryDefinition, KeywordTier};
use crate::processing::similarity::{round2, Similarity, SimilarityEngine};
use crate::processing::text_processor::TextProcessor;
use aho_corasick::AhoCorasick;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown in place of evidence when no resume sentence mentions the category
pub const NO_EXAMPLE_MARKER: &str = "No example in CV";

/// Upper bound for the phrase bonus so it can never carry a category alone
pub const MAX_PHRASE_BONUS: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierWeights {
    pub core: f64,
    pub primary: f64,
    pub secondary: f64,
    pub phrase: f64,
}

impl TierWeights {
    pub fn weight(&self, tier: KeywordTier) -> f64 {
        match tier {
            KeywordTier::Core => self.core,
            KeywordTier::Primary => self.primary,
            KeywordTier::Secondary => self.secondary,
            KeywordTier::Phrase => self.phrase,
        }
    }
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            core: 3.0,
            primary: 2.0,
            secondary: 1.0,
            phrase: 2.0,
        }
    }
}

/// Constants of the scoring blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Cap on how often one keyword is repeated in a signal string
    pub max_repetitions: u32,
    pub similarity_weight: f64,
    pub coverage_weight: f64,
    pub phrase_bonus_per_match: f64,
    pub phrase_bonus_cap: f64,
    pub use_similarity: bool,
    pub use_coverage: bool,
    pub use_phrase_bonus: bool,
    pub tier_weights: TierWeights,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            max_repetitions: 10,
            similarity_weight: 0.6,
            coverage_weight: 0.4,
            phrase_bonus_per_match: 4.0,
            phrase_bonus_cap: MAX_PHRASE_BONUS,
            use_similarity: true,
            use_coverage: true,
            use_phrase_bonus: true,
            tier_weights: TierWeights::default(),
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<()> {
        let tiers = &self.tier_weights;
        for (label, weight) in [
            ("core", tiers.core),
            ("primary", tiers.primary),
            ("secondary", tiers.secondary),
            ("phrase", tiers.phrase),
        ] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(TalentFitError::Configuration(format!(
                    "Tier weight '{}' must be a positive number, got {}",
                    label, weight
                )));
            }
        }

        if self.max_repetitions == 0 {
            return Err(TalentFitError::Configuration(
                "max_repetitions must be at least 1".to_string(),
            ));
        }

        for (label, weight) in [
            ("similarity_weight", self.similarity_weight),
            ("coverage_weight", self.coverage_weight),
            ("phrase_bonus_per_match", self.phrase_bonus_per_match),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(TalentFitError::Configuration(format!(
                    "{} must be a non-negative number, got {}",
                    label, weight
                )));
            }
        }

        if !(0.0..=MAX_PHRASE_BONUS).contains(&self.phrase_bonus_cap) {
            return Err(TalentFitError::Configuration(format!(
                "phrase_bonus_cap must be within [0, {}], got {}",
                MAX_PHRASE_BONUS, self.phrase_bonus_cap
            )));
        }

        if self.base_weight_total() <= 0.0 {
            return Err(TalentFitError::Configuration(
                "Enable similarity or coverage with a positive blend weight".to_string(),
            ));
        }

        Ok(())
    }

    fn base_weight_total(&self) -> f64 {
        let similarity = if self.use_similarity { self.similarity_weight } else { 0.0 };
        let coverage = if self.use_coverage { self.coverage_weight } else { 0.0 };
        similarity + coverage
    }

    /// `clamp(round(count * tier_weight), 1, max_repetitions)`, zero when absent
    pub fn repetitions(&self, count: usize, tier: KeywordTier) -> usize {
        if count == 0 {
            return 0;
        }
        let scaled = (count as f64 * self.tier_weights.weight(tier)).round() as usize;
        scaled.clamp(1, self.max_repetitions as usize)
    }
}

/// Score of one category. Sentinels count as 0 in the overall mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScore {
    Score(f64),
    /// No category keyword appears in the resume
    NotMentioned,
    /// The similarity backend could not compare the texts
    NotApplicable,
}

impl CategoryScore {
    pub fn numeric(&self) -> f64 {
        match self {
            CategoryScore::Score(s) => *s,
            _ => 0.0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, CategoryScore::Score(_))
    }
}

impl fmt::Display for CategoryScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryScore::Score(s) => write!(f, "{:.2}%", s),
            CategoryScore::NotMentioned => write!(f, "Not mentioned"),
            CategoryScore::NotApplicable => write!(f, "N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    Sentence(String),
    NoExample,
}

impl Evidence {
    pub fn as_str(&self) -> &str {
        match self {
            Evidence::Sentence(s) => s,
            Evidence::NoExample => NO_EXAMPLE_MARKER,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub similarity: Option<f64>,
    pub coverage: Option<f64>,
    pub phrase_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub weight: f64,
    pub threshold: f64,
    pub score: CategoryScore,
    pub evidence: Evidence,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub components: ScoreComponents,
}

impl CategoryResult {
    pub fn is_strong(&self) -> bool {
        !self.score.is_sentinel() && self.score.numeric() >= self.threshold
    }
}

/// Case-insensitive substring counts for a fixed keyword list
struct KeywordCounter {
    matcher: AhoCorasick,
    len: usize,
}

impl KeywordCounter {
    fn new(keywords: &[&str]) -> Result<Self> {
        let patterns: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let matcher = AhoCorasick::new(&patterns).map_err(|e| {
            TalentFitError::Configuration(format!("Failed to build keyword matcher: {}", e))
        })?;

        Ok(Self {
            matcher,
            len: patterns.len(),
        })
    }

    /// Non-overlapping occurrences per keyword; keywords are counted independently of each other
    fn count(&self, text: &str) -> Vec<usize> {
        let lowered = text.to_lowercase();
        let mut counts = vec![0; self.len];
        let mut last_end = vec![0; self.len];
        for mat in self.matcher.find_overlapping_iter(&lowered) {
            let pattern = mat.pattern().as_usize();
            if counts[pattern] > 0 && mat.start() < last_end[pattern] {
                continue;
            }
            counts[pattern] += 1;
            last_end[pattern] = mat.end();
        }
        counts
    }
}

pub struct CategoryScorer<'a> {
    engine: &'a dyn SimilarityEngine,
    policy: &'a ScoringPolicy,
    processor: TextProcessor,
}

impl<'a> CategoryScorer<'a> {
    pub fn new(engine: &'a dyn SimilarityEngine, policy: &'a ScoringPolicy) -> Self {
        Self {
            engine,
            policy,
            processor: TextProcessor::new(),
        }
    }

    pub fn score_category(
        &self,
        resume_text: &str,
        job_text: &str,
        category: &CategoryDefinition,
    ) -> Result<CategoryResult> {
        let keywords = category.keywords();
        let terms: Vec<&str> = keywords.iter().map(|(_, k)| *k).collect();
        let counter = KeywordCounter::new(&terms)?;

        let resume_counts = counter.count(resume_text);
        let job_counts = counter.count(job_text);

        let matched: Vec<String> = terms
            .iter()
            .zip(&resume_counts)
            .filter(|(_, count)| **count > 0)
            .map(|(k, _)| k.to_string())
            .collect();
        let missing: Vec<String> = terms
            .iter()
            .zip(&resume_counts)
            .filter(|(_, count)| **count == 0)
            .map(|(k, _)| k.to_string())
            .collect();

        let mut result = CategoryResult {
            category: category.name.clone(),
            weight: category.weight,
            threshold: category.threshold,
            score: CategoryScore::NotMentioned,
            evidence: Evidence::NoExample,
            matched_keywords: matched,
            missing_keywords: missing,
            components: ScoreComponents::default(),
        };

        if result.matched_keywords.is_empty() {
            debug!("{}: no keyword found in resume", category.name);
            return Ok(result);
        }

        result.evidence = self.find_evidence(resume_text, &terms);

        // Without any keyword in the job text, compare against the category's own profile
        let job_mentions_category = job_counts.iter().any(|c| *c > 0);
        let reference_counts: Vec<usize> = if job_mentions_category {
            job_counts
        } else {
            vec![1; terms.len()]
        };

        if self.policy.use_similarity {
            let resume_signal = self.signal(&keywords, &resume_counts);
            let job_signal = self.signal(&keywords, &reference_counts);

            match self.engine.similarity(&resume_signal, &job_signal) {
                Similarity::Score(s) => result.components.similarity = Some(s),
                Similarity::NotApplicable => {
                    debug!("{}: similarity not applicable", category.name);
                    result.score = CategoryScore::NotApplicable;
                    return Ok(result);
                }
            }
        }

        if self.policy.use_coverage {
            let expected = reference_counts.iter().filter(|c| **c > 0).count();
            let covered = reference_counts
                .iter()
                .zip(&resume_counts)
                .filter(|(reference, resume)| **reference > 0 && **resume > 0)
                .count();
            result.components.coverage = Some(covered as f64 / expected as f64 * 100.0);
        }

        if self.policy.use_phrase_bonus {
            let phrases_found = keywords
                .iter()
                .zip(&resume_counts)
                .filter(|((tier, _), count)| *tier == KeywordTier::Phrase && **count > 0)
                .count();
            result.components.phrase_bonus = (phrases_found as f64
                * self.policy.phrase_bonus_per_match)
                .min(self.policy.phrase_bonus_cap);
        }

        let score = self.blend(&result.components);
        debug!(
            "{}: score {:.2} (similarity {:?}, coverage {:?}, bonus {:.2})",
            category.name,
            score,
            result.components.similarity,
            result.components.coverage,
            result.components.phrase_bonus
        );
        result.score = CategoryScore::Score(score);

        Ok(result)
    }

    /// Each keyword repeated in proportion to its count and tier weight
    fn signal(&self, keywords: &[(KeywordTier, &str)], counts: &[usize]) -> String {
        keywords
            .iter()
            .zip(counts)
            .flat_map(|((tier, keyword), count)| {
                std::iter::repeat(*keyword).take(self.policy.repetitions(*count, *tier))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn blend(&self, components: &ScoreComponents) -> f64 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        if let Some(similarity) = components.similarity {
            weighted += similarity * self.policy.similarity_weight;
            total_weight += self.policy.similarity_weight;
        }
        if let Some(coverage) = components.coverage {
            weighted += coverage * self.policy.coverage_weight;
            total_weight += self.policy.coverage_weight;
        }

        let base = if total_weight > 0.0 { weighted / total_weight } else { 0.0 };
        round2((base + components.phrase_bonus).clamp(0.0, 100.0))
    }

    /// First sentence containing any keyword as a case-insensitive substring
    fn find_evidence(&self, resume_text: &str, keywords: &[&str]) -> Evidence {
        let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        self.processor
            .split_sentences(resume_text)
            .into_iter()
            .find(|sentence| {
                let sentence_lower = sentence.to_lowercase();
                lowered.iter().any(|k| sentence_lower.contains(k.as_str()))
            })
            .map(Evidence::Sentence)
            .unwrap_or(Evidence::NoExample)
    }
}
