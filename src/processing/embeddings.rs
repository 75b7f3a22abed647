//! Embedding similarity backend using Model2Vec static embeddings

use crate::config::SimilarityConfig;
use crate::error::{Result, TalentFitError};
use crate::processing::similarity::{Similarity, SimilarityEngine};
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use std::time::{Duration, Instant};

pub struct EmbeddingSimilarity {
    model: StaticModel,
    model_name: String,
}

impl EmbeddingSimilarity {
    /// Load the model from a local directory or a Hugging Face hub id.
    ///
    /// Hub downloads block, so loading runs on the blocking pool and is bounded
    /// by `embedding_timeout_secs`.
    pub async fn load(config: &SimilarityConfig) -> Result<Self> {
        let start_time = Instant::now();
        let model_name = config.embedding_model.clone();
        let timeout = Duration::from_secs(config.embedding_timeout_secs);

        info!("Loading Model2Vec embedding model: {}", model_name);

        let repo = model_name.clone();
        let task = tokio::task::spawn_blocking(move || {
            StaticModel::from_pretrained(&repo, None, None, None)
        });

        let model = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(loaded)) => loaded?,
            Ok(Err(join_error)) => {
                return Err(TalentFitError::Embedding(format!(
                    "Model loader crashed: {}",
                    join_error
                )))
            }
            Err(_) => {
                return Err(TalentFitError::Embedding(format!(
                    "Timed out after {}s loading model {}",
                    timeout.as_secs(),
                    model_name
                )))
            }
        };

        info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self { model, model_name })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl SimilarityEngine for EmbeddingSimilarity {
    fn similarity(&self, text_a: &str, text_b: &str) -> Similarity {
        if text_a.trim().is_empty() || text_b.trim().is_empty() {
            return Similarity::NotApplicable;
        }

        let a = self.model.encode_single(text_a);
        let b = self.model.encode_single(text_b);

        match cosine_similarity(&a, &b) {
            Some(cosine) => Similarity::from_cosine(cosine),
            None => {
                warn!("Embedding comparison was degenerate; treating as not applicable");
                Similarity::NotApplicable
            }
        }
    }

    fn name(&self) -> &str {
        "embedding"
    }
}

/// Cosine of two dense vectors; `None` for empty, mismatched, zero-norm or non-finite input
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let cosine = dot / (norm_a * norm_b);
    cosine.is_finite().then_some(cosine)
}
