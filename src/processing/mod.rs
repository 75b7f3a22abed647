//! Text processing and scoring

pub mod analyzer;
pub mod categories;
pub mod category_scorer;
pub mod embeddings;
pub mod similarity;
pub mod text_processor;
