//! Static sensor → plug mapping, built once at startup and read-only after.

use crate::types::{ActuatorAddress, SensorId};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    sensors: HashMap<SensorId, ActuatorAddress>,
}

impl DeviceRegistry {
    /// Build from ordered `(sensor, plug)` pairs. A later entry for the same
    /// sensor replaces an earlier one. Entries with a blank address are
    /// skipped, so the sensor resolves as unknown.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SensorId, ActuatorAddress)>,
    {
        let mut sensors = HashMap::new();
        for (sensor, addr) in entries {
            if addr.as_str().trim().is_empty() {
                sensors.remove(&sensor);
                continue;
            }
            sensors.insert(sensor, addr);
        }
        Self { sensors }
    }

    pub fn resolve(&self, sensor: &SensorId) -> Option<&ActuatorAddress> {
        self.sensors.get(sensor)
    }

    /// Every distinct plug address referenced by at least one sensor.
    pub fn actuators(&self) -> BTreeSet<&ActuatorAddress> {
        self.sensors.values().collect()
    }

    /// Sensor/plug pairs sorted by sensor id.
    pub fn entries(&self) -> Vec<(&SensorId, &ActuatorAddress)> {
        let mut out: Vec<_> = self.sensors.iter().collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
