pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::FraudPipeline;
use std::sync::Arc;

/// Shared application state
///
/// The pipeline is fitted offline and read-only here, so it is shared
/// directly across request handlers without locking.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FraudPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<FraudPipeline>) -> Self {
        Self { pipeline }
    }
}
