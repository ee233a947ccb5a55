use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SensorId
// ---------------------------------------------------------------------------

/// Identifier a temperature sensor reports itself under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// ActuatorAddress
// ---------------------------------------------------------------------------

/// Network address of a controllable plug, passed verbatim to the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorAddress(String);

impl ActuatorAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActuatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActuatorAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// DesiredState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    On,
    Off,
}

impl DesiredState {
    pub fn from_turn_on(turn_on: bool) -> Self {
        if turn_on {
            DesiredState::On
        } else {
            DesiredState::Off
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DesiredState::On => "on",
            DesiredState::Off => "off",
        }
    }

    /// Literal the control surface prints when a plug is in this state,
    /// e.g. `Device state: ON`.
    pub fn marker(self) -> String {
        format!("Device state: {}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DesiredState {
    type Err = crate::error::PlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(DesiredState::On),
            "off" => Ok(DesiredState::Off),
            _ => Err(crate::error::PlugError::InvalidState(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

/// Reading that triggered a request. Only ever used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
}

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Self {
        Self { celsius }
    }

    pub fn fahrenheit(self) -> f64 {
        self.celsius * (9.0 / 5.0) + 32.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} C / {:.2} F", self.celsius, self.fahrenheit())
    }
}

// ---------------------------------------------------------------------------
// ActuationRequest
// ---------------------------------------------------------------------------

/// One inbound "temperature crossed a threshold" trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuationRequest {
    pub sensor: SensorId,
    pub desired: DesiredState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
}

impl ActuationRequest {
    pub fn new(sensor: SensorId, desired: DesiredState) -> Self {
        Self {
            sensor,
            desired,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<Temperature>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_formats_both_scales() {
        assert_eq!(Temperature::from_celsius(21.5).to_string(), "21.50 C / 70.70 F");
        assert_eq!(Temperature::from_celsius(-40.0).to_string(), "-40.00 C / -40.00 F");
    }

    #[test]
    fn marker_is_upper_cased() {
        assert_eq!(DesiredState::On.marker(), "Device state: ON");
        assert_eq!(DesiredState::Off.marker(), "Device state: OFF");
    }

    #[test]
    fn from_str_rejects_anything_but_on_off() {
        assert_eq!("on".parse::<DesiredState>().unwrap(), DesiredState::On);
        assert_eq!("off".parse::<DesiredState>().unwrap(), DesiredState::Off);
        assert!("ON".parse::<DesiredState>().is_err());
        assert!("true".parse::<DesiredState>().is_err());
    }

    #[test]
    fn from_turn_on_maps_bool() {
        assert_eq!(DesiredState::from_turn_on(true), DesiredState::On);
        assert_eq!(DesiredState::from_turn_on(false), DesiredState::Off);
    }
}
