use crate::output::{print_json, print_table};
use clap::Subcommand;
use plugctl_core::config::WarnLevel;
use plugctl_core::registry::DeviceRegistry;
use std::path::Path;

use super::load_config;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,

    /// Show the effective sensor → plug mapping
    Show,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(config_path, json),
        ConfigSubcommand::Show => show(config_path, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = DeviceRegistry::new(config.registry_entries());

    if json {
        let sensors: Vec<serde_json::Value> = registry
            .entries()
            .into_iter()
            .map(|(sensor, plug)| serde_json::json!({ "sensor_id": sensor, "plug": plug }))
            .collect();
        return print_json(&serde_json::json!({
            "system_name": config.system_name,
            "kasa": config.kasa_binary(),
            "command_timeout_secs": config.command_timeout_secs,
            "sensors": sensors,
        }));
    }

    println!("System:  {}", config.system_name);
    println!("Kasa:    {}", config.kasa_binary().display());
    println!("Timeout: {}s", config.command_timeout_secs);
    println!();

    if registry.is_empty() {
        println!("No sensors mapped.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = registry
        .entries()
        .into_iter()
        .map(|(sensor, plug)| vec![sensor.to_string(), plug.to_string()])
        .collect();
    print_table(&["SENSOR", "PLUG"], &rows);
    Ok(())
}
