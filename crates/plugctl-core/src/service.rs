use std::sync::Arc;

use crate::config::Config;
use crate::event_log::EventLog;
use crate::executor::ControlSurface;
use crate::orchestrator::{ActuationOutcome, Orchestrator};
use crate::registry::DeviceRegistry;
use crate::reporter::EventReporter;
use crate::types::ActuationRequest;

/// One full trigger cycle: actuate, then report. Shared by the HTTP server
/// and the `actuate` CLI command.
pub struct ActuationService {
    orchestrator: Orchestrator,
    reporter: EventReporter,
}

impl ActuationService {
    pub fn new(orchestrator: Orchestrator, reporter: EventReporter) -> Self {
        Self {
            orchestrator,
            reporter,
        }
    }

    /// Wire a service from config with the given control surface and event sink.
    pub fn from_config(
        config: &Config,
        surface: Arc<dyn ControlSurface>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        let registry = Arc::new(DeviceRegistry::new(config.registry_entries()));
        Self::new(
            Orchestrator::new(registry, surface),
            EventReporter::new(log),
        )
    }

    pub fn registry(&self) -> &DeviceRegistry {
        self.orchestrator.registry()
    }

    pub async fn handle(&self, request: &ActuationRequest) -> ActuationOutcome {
        let outcome = self
            .orchestrator
            .actuate(&request.sensor, request.desired)
            .await;
        self.reporter.report(request, &outcome).await;
        outcome
    }
}
