//! Progress stream state machine.
//!
//! One [`ProgressStream`] exists per submitted task. Inputs come from the
//! transport (`Opened`, `Message`, `TransportFailed`); the handler answers
//! with the next stream value plus a list of [`StreamIntent`]s for the caller
//! to apply. Nothing here touches the network.

use serde::Deserialize;

use crate::{InspectionError, Severity};

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Connecting,
    Streaming,
    Completed,
    Failed,
    Disconnected,
}

impl StreamPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StreamPhase::Completed | StreamPhase::Failed | StreamPhase::Disconnected
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub current: u64,
    pub total: u64,
    /// Server-reported, never recomputed from `current / total`.
    pub percent: u8,
    pub last_log_message: Option<String>,
}

impl ProgressState {
    pub fn percent_label(&self) -> String {
        format!("{}%", self.percent)
    }

    pub fn count_label(&self) -> String {
        format!("{} / {}", self.current, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    Completed { download_url: String },
    Failed { message: String },
    Disconnected,
}

/// Payload of one `data:` frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Log {
        message: String,
    },
    Progress {
        current: u64,
        total: u64,
        percent: f64,
        #[serde(default)]
        log: Option<String>,
    },
    Complete {
        download_url: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

impl StreamEvent {
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamInput {
    Opened,
    Message(String),
    TransportFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamIntent {
    Notify {
        severity: Severity,
        message: String,
    },
    Report(InspectionError),
    UpdateProgress {
        current: u64,
        total: u64,
        percent: u8,
        log: Option<String>,
    },
    /// Close the transport and record the outcome.
    Close(TerminalOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStream {
    task_id: TaskId,
    phase: StreamPhase,
}

impl ProgressStream {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            phase: StreamPhase::Connecting,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Single inbound handler. Terminal streams swallow every input.
    pub fn handle(mut self, input: StreamInput) -> (Self, Vec<StreamIntent>) {
        if self.phase.is_terminal() {
            return (self, Vec::new());
        }

        let intents = match input {
            StreamInput::Opened => {
                self.phase = StreamPhase::Streaming;
                Vec::new()
            }
            StreamInput::Message(payload) => {
                self.phase = StreamPhase::Streaming;
                self.on_message(&payload)
            }
            StreamInput::TransportFailed(_) => {
                self.phase = StreamPhase::Disconnected;
                vec![
                    StreamIntent::Report(InspectionError::StreamDisconnected),
                    StreamIntent::Close(TerminalOutcome::Disconnected),
                ]
            }
        };

        (self, intents)
    }

    fn on_message(&mut self, payload: &str) -> Vec<StreamIntent> {
        let event = match StreamEvent::parse(payload) {
            Ok(event) => event,
            Err(err) => {
                return vec![StreamIntent::Notify {
                    severity: Severity::Error,
                    message: format!("Malformed stream event ignored: {err}"),
                }];
            }
        };

        match event {
            StreamEvent::Log { message } => vec![StreamIntent::Notify {
                severity: Severity::Info,
                message,
            }],
            StreamEvent::Progress {
                current,
                total,
                percent,
                log,
            } => {
                let mut intents = Vec::with_capacity(2);
                intents.push(StreamIntent::UpdateProgress {
                    current,
                    total,
                    percent: clamp_percent(percent),
                    log: log.clone(),
                });
                if let Some(message) = log {
                    intents.push(StreamIntent::Notify {
                        severity: Severity::System,
                        message,
                    });
                }
                intents
            }
            StreamEvent::Complete { download_url } => {
                self.phase = StreamPhase::Completed;
                vec![
                    StreamIntent::Notify {
                        severity: Severity::Success,
                        message: "Inspection Complete!".to_string(),
                    },
                    StreamIntent::Close(TerminalOutcome::Completed { download_url }),
                ]
            }
            StreamEvent::Error { message } => {
                self.phase = StreamPhase::Failed;
                vec![
                    StreamIntent::Report(InspectionError::StreamFailed(message.clone())),
                    StreamIntent::Close(TerminalOutcome::Failed { message }),
                ]
            }
        }
    }
}

fn clamp_percent(percent: f64) -> u8 {
    if percent.is_nan() {
        return 0;
    }
    percent.round().clamp(0.0, 100.0) as u8
}
