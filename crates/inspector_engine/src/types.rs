use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

pub type UploadAttempt = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Source,
    Target,
    Glossary,
}

impl UploadKind {
    /// Multipart field the server reads the file from.
    pub fn field_name(self) -> &'static str {
        match self {
            UploadKind::Source => "source",
            UploadKind::Target => "target",
            UploadKind::Glossary => "glossary",
        }
    }

    /// Response key holding the stored file id.
    pub fn id_key(self) -> &'static str {
        match self {
            UploadKind::Source => "source_file_id",
            UploadKind::Target => "target_file_id",
            UploadKind::Glossary => "glossary_file_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub file_id: String,
    pub sheets: Vec<String>,
}

/// Body of `POST /start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartRequest {
    pub source_file_id: String,
    pub target_file_id: String,
    pub sheets: Vec<String>,
    pub sheet_langs: BTreeMap<String, serde_json::Value>,
    pub glossary_file_id: Option<String>,
    pub cell_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    Opened,
    Message(String),
    Lost(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadCompleted {
        kind: UploadKind,
        attempt: UploadAttempt,
        result: Result<UploadResponse, ApiError>,
    },
    StartCompleted {
        result: Result<String, ApiError>,
    },
    Stream {
        task_id: String,
        signal: StreamSignal,
    },
    DownloadCompleted {
        task_id: String,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Non-2xx answer; `message` is already the human-readable part.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

/// The engine thread has exited; its event channel is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine thread stopped")]
pub struct EngineStopped;

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
