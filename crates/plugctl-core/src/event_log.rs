//! Date-stamped event log files and the critical-alert path.
//!
//! Every line lands in `<prefix>-YYYY-MM-DD` as `[<RFC3339>] <text>`. The
//! [`Logger`] writes request/outcome records to the info file, access lines to
//! the access file, and routes critical messages through an [`Emailer`] as
//! well. Write and delivery failures are reported through `tracing` and never
//! surface to the caller.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, SecondsFormat};

use crate::config::Config;
use crate::email::Emailer;
use crate::error::Result;

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Sink for operator-facing events. `critical*` also notify out of band.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn info(&self, message: &str);

    /// `headline` is a short summary used in the alert subject.
    async fn critical(&self, headline: &str, message: &str);

    async fn critical_error(&self, err: &(dyn std::error::Error + Send + Sync));

    async fn access(&self, _method: &str, _remote: &str, _uri: &str) {}
}

// ---------------------------------------------------------------------------
// DateFileWriter
// ---------------------------------------------------------------------------

/// Appends timestamped lines to one file per local calendar day.
#[derive(Debug)]
pub struct DateFileWriter {
    prefix: PathBuf,
    lock: Mutex<()>,
}

impl DateFileWriter {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// `<prefix>-YYYY-MM-DD` for the given day.
    pub fn filename(&self, date: NaiveDate) -> PathBuf {
        let mut name = self.prefix.as_os_str().to_owned();
        name.push(format!("-{}", date.format("%Y-%m-%d")));
        PathBuf::from(name)
    }

    pub fn append(&self, text: &str) -> Result<()> {
        self.append_at(Local::now(), text)
    }

    pub fn append_at(&self, at: DateTime<Local>, text: &str) -> Result<()> {
        let path = self.filename(at.date_naive());
        let line = format!("[{}] {}\n", at.to_rfc3339_opts(SecondsFormat::Secs, false), text);

        // One writer per file prefix; serialize so concurrent lines never interleave.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        f.write_all(line.as_bytes())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

pub struct Logger {
    system_name: String,
    info: Arc<DateFileWriter>,
    access: Arc<DateFileWriter>,
    emailer: Arc<dyn Emailer>,
}

impl Logger {
    pub fn new(
        system_name: impl Into<String>,
        info: Arc<DateFileWriter>,
        access: Arc<DateFileWriter>,
        emailer: Arc<dyn Emailer>,
    ) -> Self {
        Self {
            system_name: system_name.into(),
            info,
            access,
            emailer,
        }
    }

    /// Info and access writers under `logging.directory`.
    pub fn from_config(config: &Config, emailer: Arc<dyn Emailer>) -> Self {
        Self::new(
            config.system_name.clone(),
            Arc::new(DateFileWriter::new(config.logging.info_prefix())),
            Arc::new(DateFileWriter::new(config.logging.access_prefix())),
            emailer,
        )
    }

    pub fn info_writer(&self) -> Arc<DateFileWriter> {
        self.info.clone()
    }

    fn append_info(&self, text: &str) {
        if let Err(e) = self.info.append(text) {
            tracing::warn!(
                "failed to write info log {}: {e}",
                self.info.prefix().display()
            );
        }
    }

    async fn escalate(&self, subject: &str, body: &str) {
        self.append_info(&format!("{subject}: {body}"));
        if let Err(e) = self.emailer.email(subject, body).await {
            tracing::warn!("failed to deliver alert '{subject}': {e}");
        }
    }
}

#[async_trait]
impl EventLog for Logger {
    async fn info(&self, message: &str) {
        tracing::info!("{message}");
        self.append_info(message);
    }

    async fn critical(&self, headline: &str, message: &str) {
        tracing::error!("{headline}: {message}");
        let subject = format!("Critical message from {}: {headline}", self.system_name);
        self.escalate(&subject, message).await;
    }

    async fn critical_error(&self, err: &(dyn std::error::Error + Send + Sync)) {
        tracing::error!("{err}");
        let subject = format!("Critical error from {}", self.system_name);
        self.escalate(&subject, &err.to_string()).await;
    }

    async fn access(&self, method: &str, remote: &str, uri: &str) {
        if let Err(e) = self.access.append(&format!("{method} {remote} {uri}")) {
            tracing::warn!(
                "failed to write access log {}: {e}",
                self.access.prefix().display()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
