//! Turns actuation outcomes into log records and alerts.
//!
//! Every outcome produces exactly one info record. Every outcome other than
//! `Confirmed` additionally produces exactly one critical alert.

use std::sync::Arc;

use crate::event_log::EventLog;
use crate::orchestrator::ActuationOutcome;
use crate::types::ActuationRequest;

pub struct EventReporter {
    log: Arc<dyn EventLog>,
}

impl EventReporter {
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self { log }
    }

    pub async fn report(&self, request: &ActuationRequest, outcome: &ActuationOutcome) {
        let sensor = &request.sensor;
        let state = request.desired;
        let temp = request
            .temperature
            .map(|t| format!(" Temp: {t}"))
            .unwrap_or_default();

        let Some(reason) = outcome.reason() else {
            self.log
                .info(&format!(
                    "[{sensor}] Successfully fulfilled request to turn {state} corresponding plug.{temp}"
                ))
                .await;
            return;
        };

        self.log
            .info(&format!(
                "[{sensor}] Failed request to turn {state} corresponding plug ({}).{temp}",
                outcome.kind()
            ))
            .await;
        let headline = format!("[{sensor}] failed to turn {state} plug: {}", outcome.kind());
        self.log.critical(&headline, &reason).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DesiredState, SensorId, Temperature};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLog {
        infos: Mutex<Vec<String>>,
        criticals: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl EventLog for RecordingLog {
        async fn info(&self, message: &str) {
            self.infos.lock().unwrap().push(message.to_string());
        }

        async fn critical(&self, headline: &str, message: &str) {
            self.criticals
                .lock()
                .unwrap()
                .push((headline.to_string(), message.to_string()));
        }

        async fn critical_error(&self, err: &(dyn std::error::Error + Send + Sync)) {
            self.criticals
                .lock()
                .unwrap()
                .push((String::new(), err.to_string()));
        }
    }

    fn request() -> ActuationRequest {
        ActuationRequest::new(SensorId::from("s1"), DesiredState::On)
            .with_temperature(Some(Temperature::from_celsius(21.5)))
    }

    #[tokio::test]
    async fn confirmed_logs_once_and_never_alerts() {
        let log = Arc::new(RecordingLog::default());
        let reporter = EventReporter::new(log.clone());

        reporter
            .report(&request(), &ActuationOutcome::Confirmed)
            .await;

        let infos = log.infos.lock().unwrap().clone();
        assert_eq!(
            infos,
            vec!["[s1] Successfully fulfilled request to turn on corresponding plug. Temp: 21.50 C / 70.70 F"]
        );
        assert!(log.criticals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_failure_kind_logs_once_and_alerts_once() {
        let failures = [
            ActuationOutcome::UnknownSensor(SensorId::from("s1")),
            ActuationOutcome::CommandFailed("set broke".into()),
            ActuationOutcome::QueryFailed("query broke".into()),
            ActuationOutcome::ValidationFailed("Device state: OFF".into()),
        ];

        for outcome in failures {
            let log = Arc::new(RecordingLog::default());
            let reporter = EventReporter::new(log.clone());

            reporter.report(&request(), &outcome).await;

            assert_eq!(log.infos.lock().unwrap().len(), 1, "{outcome:?}");
            let criticals = log.criticals.lock().unwrap().clone();
            assert_eq!(criticals.len(), 1, "{outcome:?}");
            assert!(criticals[0].0.contains("[s1]"));
            assert!(criticals[0].0.contains(outcome.kind()));
            assert_eq!(Some(criticals[0].1.clone()), outcome.reason());
        }
    }

    #[tokio::test]
    async fn temperature_is_optional() {
        let log = Arc::new(RecordingLog::default());
        let reporter = EventReporter::new(log.clone());
        let req = ActuationRequest::new(SensorId::from("s2"), DesiredState::Off);

        reporter.report(&req, &ActuationOutcome::Confirmed).await;

        assert_eq!(
            log.infos.lock().unwrap()[0],
            "[s2] Successfully fulfilled request to turn off corresponding plug."
        );
    }
}
