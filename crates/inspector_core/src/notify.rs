use chrono::{DateTime, Local};
use engine_logging::{engine_error, engine_info};

use crate::InspectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    System,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub at: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
    /// Set when the entry reports a workflow failure.
    pub error: Option<InspectionError>,
}

/// Append-only diagnostics sink shared by every stage of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => engine_error!("{}", message),
            Severity::Info | Severity::System | Severity::Success => {
                engine_info!("{}", message)
            }
        }
        self.entries.push(Notification {
            at: Local::now(),
            severity,
            message,
            error: None,
        });
    }

    /// Records a failure at error severity, keeping the typed error.
    pub fn push_error(&mut self, error: InspectionError) {
        let message = error.to_string();
        engine_error!("{}", message);
        self.entries.push(Notification {
            at: Local::now(),
            severity: Severity::Error,
            message,
            error: Some(error),
        });
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Entries appended after the first `start` ones.
    pub fn since(&self, start: usize) -> &[Notification] {
        self.entries.get(start..).unwrap_or(&[])
    }

    pub fn errors(&self) -> impl Iterator<Item = &InspectionError> {
        self.entries.iter().filter_map(|entry| entry.error.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
