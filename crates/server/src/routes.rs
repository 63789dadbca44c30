//! API route handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use engine::Verdict;
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub flow_rate: f64,
    #[serde(default)]
    pub total_usage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Verdict>, (StatusCode, Json<ErrorResponse>)> {
    tracing::info!(flow_rate = req.flow_rate, "reading received");

    let verdict = {
        let mut engine = state.engine.lock().await;
        engine.ingest(req.flow_rate, req.total_usage)
    };

    match verdict {
        Ok(verdict) => {
            // Commit the snapshot only after a successful ingest.
            *state.snapshot.write().await = Some(verdict.clone());
            Ok(Json(verdict))
        }
        Err(err) => {
            tracing::error!(%err, "ingest failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ))
        }
    }
}

pub async fn data(State(state): State<AppState>) -> Json<Option<Verdict>> {
    Json(state.snapshot.read().await.clone())
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    /// Forecast horizon in hours.
    #[serde(default = "default_horizon")]
    pub hours: usize,
}

/// One week at the series' hourly granularity.
fn default_horizon() -> usize {
    7 * 24
}

#[derive(Debug, Serialize)]
pub struct WeeklyResponse {
    pub predictions: Vec<f64>,
    pub horizon_hours: usize,
}

pub async fn predict_weekly(
    State(state): State<AppState>,
    Query(query): Query<WeeklyQuery>,
) -> Json<WeeklyResponse> {
    let predictions = {
        let engine = state.engine.lock().await;
        engine.predict_usage(query.hours)
    };
    Json(WeeklyResponse {
        predictions,
        horizon_hours: query.hours,
    })
}

#[derive(Debug, Deserialize)]
pub struct MotorRequest {
    #[serde(default = "default_motor_state")]
    pub state: String,
}

fn default_motor_state() -> String {
    "OFF".to_string()
}

#[derive(Debug, Serialize)]
pub struct MotorResponse {
    pub state: String,
}

pub async fn control_motor(
    State(state): State<AppState>,
    Json(req): Json<MotorRequest>,
) -> Json<MotorResponse> {
    state.motor.write().await.state = req.state.clone();

    // Best-effort relay to the device; failures are logged, never
    // surfaced to the caller.
    if let Some(url) = &state.relay_url {
        let result = state
            .http
            .post(url)
            .json(&serde_json::json!({ "state": req.state }))
            .send()
            .await;
        if let Err(err) = result {
            tracing::warn!(%err, url = %url, "motor relay not responding");
        }
    }

    Json(MotorResponse { state: req.state })
}

pub async fn motor_status(State(state): State<AppState>) -> Json<MotorResponse> {
    Json(MotorResponse {
        state: state.motor.read().await.state.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_total_is_optional() {
        let req: UpdateRequest = serde_json::from_str(r#"{"flow_rate": 11.5}"#).unwrap();
        assert_eq!(req.flow_rate, 11.5);
        assert!(req.total_usage.is_none());

        let req: UpdateRequest =
            serde_json::from_str(r#"{"flow_rate": 11.5, "total_usage": 10.0}"#).unwrap();
        assert_eq!(req.total_usage, Some(10.0));
    }

    #[test]
    fn test_weekly_query_defaults_to_one_week() {
        let query: WeeklyQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.hours, 168);
    }
}
