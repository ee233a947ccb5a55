//! Command-and-verify protocol for a single plug.
//!
//! One [`Orchestrator::actuate`] call walks resolve → set → query → compare,
//! strictly in that order, and always ends in exactly one
//! [`ActuationOutcome`]. There are no retries and no rollback. Any failure
//! short-circuits straight to the outcome.
//!
//! Set and verify for one plug address run under a per-address lock, so two
//! overlapping requests for the same plug cannot interleave their commands.
//! Requests for different plugs proceed independently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::executor::{ControlSurface, Operation};
use crate::registry::DeviceRegistry;
use crate::types::{ActuatorAddress, DesiredState, SensorId};

// ---------------------------------------------------------------------------
// ActuationOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ActuationOutcome {
    /// The control surface reported exactly the requested state after the set.
    Confirmed,
    /// No plug is configured for the sensor. Nothing was invoked.
    UnknownSensor(SensorId),
    /// The set command failed; the plug may not have changed.
    CommandFailed(String),
    /// The set command succeeded but reading the state back failed.
    QueryFailed(String),
    /// The read-back succeeded but did not show the requested state.
    ValidationFailed(String),
}

impl ActuationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ActuationOutcome::Confirmed)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ActuationOutcome::Confirmed => "confirmed",
            ActuationOutcome::UnknownSensor(_) => "unknown_sensor",
            ActuationOutcome::CommandFailed(_) => "command_failed",
            ActuationOutcome::QueryFailed(_) => "query_failed",
            ActuationOutcome::ValidationFailed(_) => "validation_failed",
        }
    }

    /// Diagnostic text for failures; `None` when confirmed.
    pub fn reason(&self) -> Option<String> {
        match self {
            ActuationOutcome::Confirmed => None,
            ActuationOutcome::UnknownSensor(id) => {
                Some(format!("no plug is configured for sensor {id}"))
            }
            ActuationOutcome::CommandFailed(r)
            | ActuationOutcome::QueryFailed(r)
            | ActuationOutcome::ValidationFailed(r) => Some(r.clone()),
        }
    }
}

impl fmt::Display for ActuationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {reason}", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    registry: Arc<DeviceRegistry>,
    surface: Arc<dyn ControlSurface>,
    locks: HashMap<ActuatorAddress, Mutex<()>>,
}

impl Orchestrator {
    pub fn new(registry: Arc<DeviceRegistry>, surface: Arc<dyn ControlSurface>) -> Self {
        // The registry is immutable, so every address that can ever be
        // resolved is known here and the lock table never needs to grow.
        let locks = registry
            .actuators()
            .into_iter()
            .map(|addr| (addr.clone(), Mutex::new(())))
            .collect();
        Self {
            registry,
            surface,
            locks,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Drive the plug associated with `sensor` to `desired` and confirm it.
    pub async fn actuate(&self, sensor: &SensorId, desired: DesiredState) -> ActuationOutcome {
        let Some(address) = self.registry.resolve(sensor) else {
            tracing::debug!(sensor = %sensor, "no plug configured");
            return ActuationOutcome::UnknownSensor(sensor.clone());
        };

        let _guard = match self.locks.get(address) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        tracing::debug!(sensor = %sensor, address = %address, state = %desired, "setting plug");
        let set = self
            .surface
            .execute(address, Operation::Set(desired))
            .await;
        if set.is_failure() {
            return ActuationOutcome::CommandFailed(format!(
                "Failed to turn {desired} plug at {address} for sensor {sensor} with {}",
                set.failure_detail()
            ));
        }

        tracing::debug!(sensor = %sensor, address = %address, "verifying plug state");
        let query = self.surface.execute(address, Operation::QueryState).await;
        if query.is_failure() {
            return ActuationOutcome::QueryFailed(format!(
                "Failed to validate state {desired} for plug at {address} for sensor {sensor} with {}",
                query.failure_detail()
            ));
        }

        if !query.stdout.contains(&desired.marker()) {
            return ActuationOutcome::ValidationFailed(format!(
                "Unexpected state when turning plug {desired} at {address} for sensor {sensor} with stdout {}",
                query.stdout.trim_end()
            ));
        }

        ActuationOutcome::Confirmed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
