//! Text-based fraud screening for product listings.
//!
//! Two entry points share this library: the `fraud-trainer` binary fits a
//! TF-IDF + multinomial Naive Bayes pipeline from a labeled CSV and writes
//! the artifact to disk, and the `fraud-screener` binary loads that artifact
//! at startup and serves fraud verdicts over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod ml;
pub mod training;
