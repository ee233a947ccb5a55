use crate::error::{PlugError, Result};
use crate::types::{ActuatorAddress, SensorId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const KASA_BINARY: &str = "kasa";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
        }
    }
}

impl LoggingConfig {
    /// Prefix for the daily info log files (`<dir>/info-YYYY-MM-DD`).
    pub fn info_prefix(&self) -> PathBuf {
        self.directory.join("info")
    }

    pub fn access_prefix(&self) -> PathBuf {
        self.directory.join("access")
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub from: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            password: String::new(),
            to: String::new(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
        }
    }
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty() && !self.smtp_host.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DevicesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlugEntry {
    pub id: String,
    pub ip_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEntry {
    pub id: String,
    pub corresponding_plug_ip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevicesConfig {
    #[serde(default)]
    pub plugs: Vec<PlugEntry>,
    #[serde(default)]
    pub sensors: Vec<SensorEntry>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the `kasa` binary. `None` resolves `kasa` from PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kasa_dir: Option<PathBuf>,
    #[serde(default = "default_system_name")]
    pub system_name: String,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
}

fn default_system_name() -> String {
    "plugctl".to_string()
}

fn default_command_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kasa_dir: None,
            system_name: default_system_name(),
            command_timeout_secs: default_command_timeout_secs(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            email: EmailConfig::default(),
            devices: DevicesConfig::default(),
        }
    }
}

impl Config {
    /// Read the YAML file at `path` without applying environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlugError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    /// Read the YAML file at `path`, then layer process environment variables on top.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut cfg = Self::load(path)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data)?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    /// Numeric values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("KASA_DIR") {
            self.kasa_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SYSTEM_NAME") {
            self.system_name = v;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = lookup("LOG_DIRECTORY") {
            self.logging.directory = PathBuf::from(v);
        }
        if let Some(v) = lookup("EMAIL_FROM") {
            self.email.from = v;
        }
        if let Some(v) = lookup("EMAIL_PASSWORD") {
            self.email.password = v;
        }
        if let Some(v) = lookup("EMAIL_TO") {
            self.email.to = v;
        }
        if let Some(v) = lookup("SMTP_HOST") {
            self.email.smtp_host = v;
        }
        if let Some(port) = lookup("SMTP_PORT").and_then(|v| v.parse().ok()) {
            self.email.smtp_port = port;
        }
        if let Some(secs) = lookup("PLUGCTL_COMMAND_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.command_timeout_secs = secs;
        }
    }

    /// The control binary to invoke: `<kasa_dir>/kasa`, or bare `kasa` for PATH lookup.
    pub fn kasa_binary(&self) -> PathBuf {
        match &self.kasa_dir {
            Some(dir) => dir.join(KASA_BINARY),
            None => PathBuf::from(KASA_BINARY),
        }
    }

    /// Reject settings no control surface can run with. Softer problems are
    /// left to [`Config::validate`].
    pub fn ensure_runnable(&self) -> Result<()> {
        if self.command_timeout_secs == 0 {
            return Err(PlugError::InvalidConfig(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Sensor → plug associations in file order, ready for the device registry.
    pub fn registry_entries(&self) -> Vec<(SensorId, ActuatorAddress)> {
        self.devices
            .sensors
            .iter()
            .map(|s| {
                (
                    SensorId::new(s.id.clone()),
                    ActuatorAddress::new(s.corresponding_plug_ip.clone()),
                )
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.command_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "command_timeout_secs must be greater than zero".to_string(),
            });
        }

        let known_plugs: HashSet<&str> = self
            .devices
            .plugs
            .iter()
            .map(|p| p.ip_addr.as_str())
            .collect();
        let mut seen = HashSet::new();

        for (i, sensor) in self.devices.sensors.iter().enumerate() {
            if sensor.id.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("devices.sensors[{i}] has an empty id"),
                });
                continue;
            }
            if sensor.corresponding_plug_ip.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("sensor '{}' has an empty corresponding_plug_ip", sensor.id),
                });
            } else if !known_plugs.is_empty()
                && !known_plugs.contains(sensor.corresponding_plug_ip.as_str())
            {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "sensor '{}' points at {} which is not listed in devices.plugs",
                        sensor.id, sensor.corresponding_plug_ip
                    ),
                });
            }
            if !seen.insert(sensor.id.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "sensor '{}' is listed more than once; the last entry wins",
                        sensor.id
                    ),
                });
            }
        }

        for plug in &self.devices.plugs {
            if plug.ip_addr.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("plug '{}' has an empty ip_addr", plug.id),
                });
            }
        }

        if !self.email.is_configured() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "email is not configured; critical alerts will only be logged"
                    .to_string(),
            });
        }

        match &self.kasa_dir {
            Some(_) => {
                let bin = self.kasa_binary();
                if !bin.exists() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("kasa binary not found at {}", bin.display()),
                    });
                }
            }
            None => {
                if which::which(KASA_BINARY).is_err() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: "kasa not found on PATH and kasa_dir is not set".to_string(),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
