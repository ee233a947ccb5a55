use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /health: liveness plus the number of mapped sensors.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sensors": app.service.registry().len(),
    }))
}
