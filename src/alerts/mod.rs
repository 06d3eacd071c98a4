//! User-facing notifications.

use crate::core::ConsoleError;
use crate::messages::{Args, Messages};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{Level, event};

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertVariant {
    Success,
    Danger,
    Warning,
    Info,
}

impl fmt::Display for AlertVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertVariant::Success => "success",
            AlertVariant::Danger => "danger",
            AlertVariant::Warning => "warning",
            AlertVariant::Info => "info",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub variant: AlertVariant,
    /// Extra detail, e.g. the full error behind a failed request
    pub description: Option<String>,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(message: impl Into<String>, variant: AlertVariant) -> Self {
        Self {
            message: message.into(),
            variant,
            description: None,
            raised_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Destination for alerts
pub trait AlertSink: Send + Sync {
    fn publish(&self, alert: Alert);
}

/// Keeps every published alert in memory.
#[derive(Debug, Default)]
pub struct AlertLog {
    alerts: Mutex<Vec<Alert>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Alert>> {
        // A panicking publisher cannot leave the vector half-written.
        self.alerts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn last(&self) -> Option<Alert> {
        self.entries().last().cloned()
    }

    /// Removes and returns everything published so far
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.entries())
    }
}

impl AlertSink for AlertLog {
    fn publish(&self, alert: Alert) {
        self.entries().push(alert);
    }
}

/// Prints alerts on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalAlerts;

impl TerminalAlerts {
    fn write_to(out: &mut impl Write, alert: &Alert) -> std::io::Result<()> {
        writeln!(out, "[{}] {}", alert.variant, alert.message)?;
        if let Some(description) = &alert.description {
            writeln!(out, "    {}", description)?;
        }
        out.flush()
    }
}

impl AlertSink for TerminalAlerts {
    fn publish(&self, alert: Alert) {
        if let Err(err) = Self::write_to(&mut std::io::stderr().lock(), &alert) {
            event!(
                Level::DEBUG,
                error = %err,
                message = %alert.message,
                "alert not written to stderr"
            );
        }
    }
}

/// Front used by the workflows: resolves message keys, then publishes.
#[derive(Clone)]
pub struct Alerts {
    messages: Arc<Messages>,
    sink: Arc<dyn AlertSink>,
}

impl Alerts {
    pub fn new(messages: Arc<Messages>, sink: Arc<dyn AlertSink>) -> Self {
        Self { messages, sink }
    }

    /// English catalog, publishing to `sink`
    pub fn with_sink(sink: Arc<dyn AlertSink>) -> Self {
        Self::new(Messages::global().clone(), sink)
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn add_alert(&self, message: impl Into<String>, variant: AlertVariant) {
        let alert = Alert::new(message, variant);
        event!(Level::INFO, variant = %alert.variant, message = %alert.message, "alert");
        self.sink.publish(alert);
    }

    /// Publishes a danger alert for `message_key`, binding `{{error}}` to the
    /// cause's message and keeping the full cause as description.
    pub fn add_error(&self, message_key: &str, cause: &ConsoleError) {
        let message = self
            .messages
            .t(message_key, &Args::new().with("error", error_message(cause)));
        let alert = Alert::new(message, AlertVariant::Danger).with_description(cause.to_string());
        event!(Level::ERROR, key = message_key, error = %cause, "error alert");
        self.sink.publish(alert);
    }
}

/// Short message for the alert title: server message for rejected requests,
/// full display otherwise.
fn error_message(cause: &ConsoleError) -> String {
    match cause {
        ConsoleError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

impl fmt::Debug for Alerts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alerts").finish_non_exhaustive()
    }
}
