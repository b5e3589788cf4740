/// Machine Learning module for listing fraud classification
///
/// This module provides the text classification pipeline:
/// - TF-IDF feature extraction from listing text
/// - Multinomial Naive Bayes classification
/// - A composed pipeline that is fit once, serialized to disk by the
///   trainer, and loaded read-only by the service

pub mod classifier;
pub mod features;
pub mod pipeline;

pub use classifier::MultinomialNb;
pub use features::TfidfVectorizer;
pub use pipeline::{combine_listing_text, FraudPipeline, FraudVerdict, PipelineMetadata};
