use std::sync::Arc;

use plugctl_core::event_log::{DateFileWriter, EventLog};
use plugctl_core::service::ActuationService;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ActuationService>,
    pub events: Arc<dyn EventLog>,
    /// Daily info log files served back by `GET /logs`.
    pub info_log: Arc<DateFileWriter>,
}

impl AppState {
    pub fn new(
        service: Arc<ActuationService>,
        events: Arc<dyn EventLog>,
        info_log: Arc<DateFileWriter>,
    ) -> Self {
        Self {
            service,
            events,
            info_log,
        }
    }
}
