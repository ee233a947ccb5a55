mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "plugctl",
    about = "Temperature-triggered smart plug controller: switch a sensor's plug and confirm it took effect",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the YAML config file
    #[arg(
        long,
        global = true,
        env = "PLUGCTL_CONFIG",
        default_value = plugctl_core::config::DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP trigger endpoints
    Serve {
        /// Port to listen on (default: server.port from the config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Switch the plug mapped to a sensor and verify the new state
    Actuate {
        /// Sensor id as listed under devices.sensors
        sensor_id: String,

        /// Desired plug state
        #[arg(value_parser = ["on", "off"])]
        state: String,

        /// Temperature reading (°C) to record with the request
        #[arg(long)]
        temp_c: Option<f64>,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(&cli.config, port),
        Commands::Actuate {
            sensor_id,
            state,
            temp_c,
        } => cmd::actuate::run(&cli.config, &sensor_id, &state, temp_c, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&cli.config, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
