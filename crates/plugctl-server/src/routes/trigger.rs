use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use plugctl_core::types::{ActuationRequest, DesiredState, SensorId, Temperature};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OutsideBoundsParams {
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub turn_on: Option<String>,
    #[serde(default)]
    pub temp_c: Option<String>,
}

impl OutsideBoundsParams {
    /// Validate the trigger. `turn_on` must be exactly `true` or `false`;
    /// an unparseable `temp_c` is dropped rather than rejected.
    pub fn into_request(self) -> Result<ActuationRequest, AppError> {
        let sensor = match self.sensor_id {
            Some(id) if !id.is_empty() => SensorId::new(id),
            _ => return Err(AppError::bad_request("sensor_id is required")),
        };
        let desired = match self.turn_on.as_deref() {
            Some("true") => DesiredState::from_turn_on(true),
            Some("false") => DesiredState::from_turn_on(false),
            _ => return Err(AppError::bad_request("turn_on must be 'true' or 'false'")),
        };
        let temperature = self
            .temp_c
            .as_deref()
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|c| c.is_finite())
            .map(Temperature::from_celsius);

        Ok(ActuationRequest::new(sensor, desired).with_temperature(temperature))
    }
}

/// GET /outside_bounds: a sensor crossed its threshold; switch its plug.
///
/// 200 when the plug confirmed the requested state, 500 for every other
/// outcome. Malformed requests are rejected with 400 before anything runs.
/// Once accepted, the actuation always completes and is reported even if
/// the client disconnects.
pub async fn outside_bounds(
    State(app): State<AppState>,
    Query(params): Query<OutsideBoundsParams>,
) -> Result<Response, AppError> {
    let request = params.into_request()?;

    let temp = request
        .temperature
        .map(|t| format!(" Temp: {t}"))
        .unwrap_or_default();
    app.events
        .info(&format!(
            "[{}] Request to turn {} corresponding plug.{temp}",
            request.sensor, request.desired
        ))
        .await;

    // The cycle runs on its own task so a dropped connection cannot cancel a
    // plug command halfway through or skip its report.
    let service = app.service.clone();
    let cycle = request.clone();
    let outcome = tokio::spawn(async move { service.handle(&cycle).await }).await?;

    let status = if outcome.is_confirmed() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let body = serde_json::json!({
        "sensor_id": request.sensor,
        "state": request.desired,
        "outcome": outcome,
    });
    Ok((status, Json(body)).into_response())
}
