pub mod actuate;
pub mod config;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use plugctl_core::config::Config;
use plugctl_core::email::{Emailer, NoopEmailer, SmtpEmailer};
use plugctl_core::event_log::Logger;
use plugctl_core::executor::KasaCli;
use plugctl_core::service::ActuationService;

/// Load the config file with environment overrides applied.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_with_env(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Long-lived collaborators shared by `serve` and `actuate`.
pub struct Wiring {
    pub logger: Arc<Logger>,
    pub service: Arc<ActuationService>,
}

pub fn wire(config: &Config) -> anyhow::Result<Wiring> {
    config.ensure_runnable()?;

    let emailer: Arc<dyn Emailer> = if config.email.is_configured() {
        Arc::new(SmtpEmailer::from_config(&config.email).context("invalid email settings")?)
    } else {
        tracing::warn!("email is not configured; critical alerts will only be logged");
        Arc::new(NoopEmailer)
    };

    let logger = Arc::new(Logger::from_config(config, emailer));
    let surface = Arc::new(KasaCli::from_config(config));
    let service = Arc::new(ActuationService::from_config(
        config,
        surface,
        logger.clone(),
    ));

    Ok(Wiring { logger, service })
}
