use std::path::Path;

use anyhow::Result;
use plugctl_core::event_log::EventLog;
use plugctl_server::AppState;

use super::{load_config, wire};

pub fn run(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path)?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let wiring = wire(&config)?;
        tracing::info!(
            "{}: {} sensor(s) mapped, kasa at {}",
            config.system_name,
            wiring.service.registry().len(),
            config.kasa_binary().display()
        );

        let state = AppState::new(
            wiring.service.clone(),
            wiring.logger.clone(),
            wiring.logger.info_writer(),
        );

        if let Err(e) = plugctl_server::serve(state, port).await {
            wiring.logger.critical_error(&*e).await;
            return Err(e);
        }
        Ok(())
    })
}
