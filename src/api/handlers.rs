use crate::api::AppState;
use crate::error::Result;
use crate::ml::combine_listing_text;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Screen a product listing for fraud
pub async fn check_product(
    State(state): State<AppState>,
    Json(request): Json<CheckProductRequest>,
) -> Result<Json<CheckProductResponse>> {
    request.validate()?;

    let text = combine_listing_text(&request.product_name, &request.description);
    let verdict = state.pipeline.score(&text)?;

    tracing::debug!(
        fraud_probability = verdict.fraud_probability,
        is_fraud = verdict.is_fraud,
        "Listing scored"
    );

    Ok(Json(CheckProductResponse {
        is_fraud: verdict.is_fraud,
        fraud_probability: verdict.fraud_probability,
        is_safe: verdict.is_safe,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckProductRequest {
    #[serde(rename = "productName")]
    #[validate(length(min = 1))]
    pub product_name: String,

    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CheckProductResponse {
    #[serde(rename = "isFraud")]
    pub is_fraud: bool,

    #[serde(rename = "fraudProbability")]
    pub fraud_probability: f64,

    #[serde(rename = "isSafe")]
    pub is_safe: bool,
}
