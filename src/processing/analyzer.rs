//! Analysis pipeline: scores every category and aggregates the results

use crate::config::{Config, SimilarityBackend};
use crate::error::{Result, TalentFitError};
use crate::processing::categories::{validate_categories, CategoryDefinition};
use crate::processing::category_scorer::{CategoryResult, CategoryScorer, ScoringPolicy};
use crate::processing::embeddings::EmbeddingSimilarity;
use crate::processing::similarity::{round2, SimilarityEngine, TfIdfSimilarity};
use crate::processing::text_processor::TextProcessor;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Scores a resume against a job description, one category at a time
pub struct AnalysisEngine {
    engine: Box<dyn SimilarityEngine>,
    policy: ScoringPolicy,
    processor: TextProcessor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Sorted descending by score; ties keep definition order
    pub results: Vec<CategoryResult>,
    pub overall_score: f64,
    pub strong: Vec<String>,
    pub needs_improvement: Vec<String>,
    pub backend: String,
}

impl AnalysisResult {
    pub fn top_category(&self) -> Option<&CategoryResult> {
        self.results.first()
    }

    pub fn strong_count(&self) -> usize {
        self.strong.len()
    }
}

impl AnalysisEngine {
    pub fn new(engine: Box<dyn SimilarityEngine>, policy: ScoringPolicy) -> Self {
        Self {
            engine,
            policy,
            processor: TextProcessor::new(),
        }
    }

    /// TF-IDF engine configured from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(TfIdfSimilarity::new(config.similarity.include_bigrams)),
            config.scoring.clone(),
        )
    }

    /// Engine for `backend`. An embedding model that fails to load, or does not
    /// load within `embedding_timeout_secs`, falls back to TF-IDF with a warning.
    pub async fn with_backend(backend: SimilarityBackend, config: &Config) -> Self {
        let engine: Box<dyn SimilarityEngine> = match backend {
            SimilarityBackend::TfIdf => {
                Box::new(TfIdfSimilarity::new(config.similarity.include_bigrams))
            }
            SimilarityBackend::Embedding => {
                match EmbeddingSimilarity::load(&config.similarity).await {
                    Ok(engine) => {
                        info!("Embedding backend ready: {}", engine.model_name());
                        Box::new(engine)
                    }
                    Err(e) => {
                        warn!("Embedding backend unavailable ({}); falling back to TF-IDF", e);
                        Box::new(TfIdfSimilarity::new(config.similarity.include_bigrams))
                    }
                }
            }
        };

        Self::new(engine, config.scoring.clone())
    }

    pub fn backend_name(&self) -> &str {
        self.engine.name()
    }

    pub fn analyze(
        &self,
        categories: &[CategoryDefinition],
        resume_text: &str,
        job_text: &str,
    ) -> Result<AnalysisResult> {
        validate_categories(categories)?;

        let resume = self.processor.normalize(resume_text);
        if resume.is_empty() {
            return Err(extraction_failed());
        }

        let job = self.processor.normalize(job_text);
        if job.is_empty() {
            return Err(TalentFitError::InvalidInput(
                "Job description is empty".to_string(),
            ));
        }

        info!(
            "Scoring {} categories with the {} backend",
            categories.len(),
            self.engine.name()
        );

        let scorer = CategoryScorer::new(self.engine.as_ref(), &self.policy);
        let results = categories
            .iter()
            .map(|category| scorer.score_category(&resume, &job, category))
            .collect::<Result<Vec<_>>>()?;

        let mut analysis = aggregate(results);
        analysis.backend = self.engine.name().to_string();

        debug!("Overall score: {:.2}", analysis.overall_score);
        Ok(analysis)
    }
}

/// Fails with the extraction error when `resume_text` normalizes to nothing.
///
/// Lets callers halt right after extraction, before paying for engine setup.
pub fn ensure_resume_text(resume_text: &str) -> Result<()> {
    if TextProcessor::new().normalize(resume_text).is_empty() {
        return Err(extraction_failed());
    }
    Ok(())
}

fn extraction_failed() -> TalentFitError {
    warn!("Resume text is empty after normalization; refusing to score");
    TalentFitError::ExtractionFailed("the resume contained no extractable text".to_string())
}

/// Weighted mean, strong / needs-improvement partition and ranking.
///
/// Sentinel scores contribute 0 to the numerator and their full weight to the
/// denominator, and never count as strong.
pub fn aggregate(mut results: Vec<CategoryResult>) -> AnalysisResult {
    let total_weight: f64 = results.iter().map(|r| r.weight).sum();
    let weighted_sum: f64 = results.iter().map(|r| r.score.numeric() * r.weight).sum();

    let overall_score = if total_weight > 0.0 {
        round2(weighted_sum / total_weight)
    } else {
        0.0
    };

    // stable: ties keep definition order
    results.sort_by(|a, b| b.score.numeric().total_cmp(&a.score.numeric()));

    let (strong, needs_improvement): (Vec<&CategoryResult>, Vec<&CategoryResult>) =
        results.iter().partition(|r| r.is_strong());

    AnalysisResult {
        strong: strong.iter().map(|r| r.category.clone()).collect(),
        needs_improvement: needs_improvement.iter().map(|r| r.category.clone()).collect(),
        overall_score,
        results,
        backend: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::categories::{default_categories, KeywordGroups};
    use crate::processing::category_scorer::{CategoryScore, Evidence, ScoreComponents};

    fn result(name: &str, score: CategoryScore, weight: f64, threshold: f64) -> CategoryResult {
        CategoryResult {
            category: name.to_string(),
            weight,
            threshold,
            score,
            evidence: Evidence::NoExample,
            matched_keywords: Vec::new(),
            missing_keywords: Vec::new(),
            components: ScoreComponents::default(),
        }
    }

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(Box::new(TfIdfSimilarity::default()), ScoringPolicy::default())
    }

    #[tokio::test]
    async fn test_with_backend_tfidf() {
        let engine = AnalysisEngine::with_backend(SimilarityBackend::TfIdf, &Config::default()).await;
        assert_eq!(engine.backend_name(), "tfidf");
    }

    #[tokio::test]
    async fn test_unloadable_embedding_model_falls_back_to_tfidf() {
        let model_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.similarity.embedding_model = model_dir.path().to_string_lossy().to_string();
        config.similarity.embedding_timeout_secs = 1;

        let load = EmbeddingSimilarity::load(&config.similarity).await;
        assert!(matches!(load, Err(TalentFitError::Embedding(_))));

        let engine = AnalysisEngine::with_backend(SimilarityBackend::Embedding, &config).await;
        assert_eq!(engine.backend_name(), "tfidf");

        let analysis = engine
            .analyze(
                &config.categories,
                "Delivered compliance training workshops.",
                &config.job.description,
            )
            .unwrap();
        assert_eq!(analysis.backend, "tfidf");
    }

    #[test]
    fn test_weighted_mean() {
        let analysis = aggregate(vec![
            result("A", CategoryScore::Score(80.0), 1.0, 70.0),
            result("B", CategoryScore::Score(60.0), 1.0, 70.0),
            result("C", CategoryScore::Score(40.0), 2.0, 70.0),
        ]);

        assert_eq!(analysis.overall_score, 55.0);
    }

    #[test]
    fn test_sentinels_count_as_zero_with_full_weight() {
        let analysis = aggregate(vec![
            result("A", CategoryScore::Score(90.0), 1.0, 70.0),
            result("B", CategoryScore::NotMentioned, 2.0, 0.0),
        ]);

        assert_eq!(analysis.overall_score, 30.0);
        assert_eq!(analysis.strong, vec!["A"]);
        assert_eq!(analysis.needs_improvement, vec!["B"]);
    }

    #[test]
    fn test_partition_uses_each_threshold() {
        let analysis = aggregate(vec![
            result("Lenient", CategoryScore::Score(50.0), 1.0, 40.0),
            result("Strict", CategoryScore::Score(80.0), 1.0, 90.0),
            result("Exact", CategoryScore::Score(65.0), 1.0, 65.0),
            result("Missing", CategoryScore::NotApplicable, 1.0, 50.0),
        ]);

        assert_eq!(analysis.strong, vec!["Exact", "Lenient"]);
        assert_eq!(analysis.needs_improvement, vec!["Strict", "Missing"]);

        for r in &analysis.results {
            let in_strong = analysis.strong.contains(&r.category);
            let in_weak = analysis.needs_improvement.contains(&r.category);
            assert!(in_strong ^ in_weak);
        }
    }

    #[test]
    fn test_results_sorted_descending_with_stable_ties() {
        let analysis = aggregate(vec![
            result("First", CategoryScore::Score(40.0), 1.0, 70.0),
            result("Top", CategoryScore::Score(90.0), 1.0, 70.0),
            result("Second", CategoryScore::Score(40.0), 1.0, 70.0),
            result("None", CategoryScore::NotMentioned, 1.0, 70.0),
        ]);

        let order: Vec<&str> = analysis.results.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(order, vec!["Top", "First", "Second", "None"]);
        assert_eq!(analysis.top_category().unwrap().category, "Top");
    }

    #[test]
    fn test_empty_resume_short_circuits() {
        let err = engine()
            .analyze(&default_categories(), " \n\t ", "Compliance role")
            .unwrap_err();

        assert!(err.is_extraction_failure());
    }

    #[test]
    fn test_ensure_resume_text() {
        assert!(ensure_resume_text("Led compliance training.").is_ok());
        assert!(ensure_resume_text("").unwrap_err().is_extraction_failure());
        assert!(ensure_resume_text("&nbsp; \n\t").unwrap_err().is_extraction_failure());
    }

    #[test]
    fn test_empty_job_is_invalid_input() {
        let err = engine()
            .analyze(&default_categories(), "Led compliance training.", "")
            .unwrap_err();

        assert!(matches!(err, TalentFitError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_categories_fail_fast() {
        let broken = vec![CategoryDefinition::new(
            "Broken",
            KeywordGroups::default(),
            1.0,
            70.0,
        )];

        let err = engine().analyze(&broken, "Led training.", "Training").unwrap_err();
        assert!(matches!(err, TalentFitError::Configuration(_)));
    }

    #[test]
    fn test_analysis_over_default_categories() {
        let resume = "Led a cross-border compliance training workshop for 20 staff. \
                      Drove M&amp;A due diligence for an acquisition.";
        let job = crate::config::DEFAULT_JOB_DESCRIPTION;

        let analysis = engine().analyze(&default_categories(), resume, job).unwrap();

        assert_eq!(analysis.results.len(), 7);
        assert_eq!(analysis.strong.len() + analysis.needs_improvement.len(), 7);
        assert_eq!(analysis.backend, "tfidf");
        assert!(analysis.overall_score > 0.0);

        let merger = analysis
            .results
            .iter()
            .find(|r| r.category == "M&A & Due Diligence")
            .unwrap();
        assert!(!merger.score.is_sentinel());
        assert_eq!(
            merger.evidence,
            Evidence::Sentence("Drove M&A due diligence for an acquisition.".to_string())
        );
    }
}
