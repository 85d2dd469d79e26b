use axum::Json;
use chrono::{SecondsFormat, Utc};

/// GET /health: liveness probe. Never touches Slack or GitHub.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}
