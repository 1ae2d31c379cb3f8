//! API route definitions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::api::state::AppState;
use crate::detect::scoring::{self, Prediction};
use crate::detect::FeatureSnapshot;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/classify", post(classify_one))
        .route("/batch-predict", post(batch_predict))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no telemetry rows provided")]
    EmptyBatch,
    #[error("invalid telemetry snapshot: {0}")]
    InvalidSnapshot(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::EmptyBatch | ApiError::InvalidSnapshot(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let uptime_secs = (chrono::Utc::now() - state.started_at).num_seconds();
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": uptime_secs
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

/// Classify a single telemetry snapshot.
async fn classify_one(Json(payload): Json<Value>) -> Result<Json<Value>, ApiError> {
    let snapshot: FeatureSnapshot =
        serde_json::from_value(payload).map_err(|e| ApiError::InvalidSnapshot(e.to_string()))?;
    let prediction = scoring::predict(snapshot);
    Ok(Json(json!({
        "data": prediction,
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    })))
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    #[serde(default)]
    data: Vec<Value>,
}

/// Classify a batch of snapshots. Rows that fail to parse are logged and
/// skipped; the caller sees the skip count in the response metadata.
async fn batch_predict(Json(request): Json<BatchRequest>) -> Result<Json<Value>, ApiError> {
    if request.data.is_empty() {
        return Err(ApiError::EmptyBatch);
    }

    let mut predictions: Vec<Prediction> = Vec::with_capacity(request.data.len());
    let mut skipped = 0usize;
    for row in request.data {
        match serde_json::from_value::<FeatureSnapshot>(row) {
            Ok(snapshot) => predictions.push(scoring::predict(snapshot)),
            Err(e) => {
                warn!(error = %e, "skipping unparseable telemetry row");
                skipped += 1;
            }
        }
    }

    let anomalies_detected = predictions.iter().filter(|p| p.is_anomaly).count();
    Ok(Json(json!({
        "predictions": predictions,
        "metadata": {
            "engine_version": env!("CARGO_PKG_VERSION"),
            "prediction_timestamp": chrono::Utc::now().to_rfc3339(),
            "request_id": uuid::Uuid::new_v4(),
            "input_rows": predictions.len(),
            "skipped_rows": skipped,
            "anomalies_detected": anomalies_detected,
            "status": "success"
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health(State(AppState::new())).await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["meta"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_classify_one_defaults_to_normal() {
        let Json(body) = classify_one(Json(json!({}))).await.unwrap();
        assert_eq!(body["data"]["incident_type"], "Normal");
        assert_eq!(body["data"]["confidence"], 0.9);
    }

    #[tokio::test]
    async fn test_classify_one_rejects_non_numeric_field() {
        let err = classify_one(Json(json!({ "mean_cpu": "eighty-five" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidSnapshot(_)));
    }

    #[tokio::test]
    async fn test_batch_predict_rejects_empty_payload() {
        let err = batch_predict(Json(BatchRequest { data: vec![] }))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmptyBatch));
    }

    #[tokio::test]
    async fn test_batch_predict_skips_bad_rows() {
        let request = BatchRequest {
            data: vec![
                json!({ "mean_cpu": 85.0, "unit_economics_ratio": 0.8 }),
                json!({ "mean_cpu": "oops" }),
                json!({}),
            ],
        };
        let Json(body) = batch_predict(Json(request)).await.unwrap();

        assert_eq!(body["metadata"]["input_rows"], 2);
        assert_eq!(body["metadata"]["skipped_rows"], 1);
        assert_eq!(body["metadata"]["anomalies_detected"], 1);
        assert_eq!(body["predictions"][0]["incident_type"], "BadDeploy");
        assert_eq!(body["predictions"][1]["incident_type"], "Normal");
    }
}
