use std::path::Path;

use anyhow::{bail, Result};
use plugctl_core::types::{ActuationRequest, DesiredState, SensorId, Temperature};

use super::{load_config, wire};
use crate::output::print_json;

/// Run one command-and-verify cycle, reporting it exactly like an HTTP trigger would.
pub fn run(
    config_path: &Path,
    sensor_id: &str,
    state: &str,
    temp_c: Option<f64>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let desired: DesiredState = state.parse()?;
    if sensor_id.is_empty() {
        bail!("sensor id must not be empty");
    }
    let request = ActuationRequest::new(SensorId::new(sensor_id), desired)
        .with_temperature(temp_c.map(Temperature::from_celsius));

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        let wiring = wire(&config)?;
        Ok::<_, anyhow::Error>(wiring.service.handle(&request).await)
    })?;

    if json {
        print_json(&serde_json::json!({
            "sensor_id": request.sensor,
            "state": request.desired,
            "outcome": outcome,
        }))?;
    } else if outcome.is_confirmed() {
        println!("[{}] plug confirmed {}", request.sensor, request.desired);
    } else {
        println!("[{}] {outcome}", request.sensor);
    }

    if !outcome.is_confirmed() {
        bail!("actuation did not complete: {}", outcome.kind());
    }
    Ok(())
}
