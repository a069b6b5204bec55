use std::fmt;
use std::path::PathBuf;

use crate::InspectionError;

/// Monotonic counter per slot; a response carrying an older attempt is stale.
pub type UploadAttempt = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKind {
    Source,
    Target,
    Glossary,
}

impl SlotKind {
    pub const ALL: [SlotKind; 3] = [SlotKind::Source, SlotKind::Target, SlotKind::Glossary];

    /// Multipart field name and log label.
    pub fn as_str(self) -> &'static str {
        match self {
            SlotKind::Source => "source",
            SlotKind::Target => "target",
            SlotKind::Glossary => "glossary",
        }
    }

    pub fn required_extension(self) -> &'static str {
        match self {
            SlotKind::Source | SlotKind::Target => ".xlsx",
            SlotKind::Glossary => ".csv",
        }
    }

    pub fn is_mandatory(self) -> bool {
        !matches!(self, SlotKind::Glossary)
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Empty,
    Uploading,
    Ready,
    Failed,
}

/// A file the user picked for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub path: PathBuf,
}

impl SelectedFile {
    /// Uses the final path component as the display name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { file_name, path }
    }
}

/// What the server handed back for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReceipt {
    pub file_id: String,
    /// Only populated for the source slot.
    pub sheets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    kind: SlotKind,
    file: Option<SelectedFile>,
    remote_file_id: Option<String>,
    state: SlotState,
    attempt: UploadAttempt,
}

impl UploadSlot {
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            file: None,
            remote_file_id: None,
            state: SlotState::Empty,
            attempt: 0,
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn remote_file_id(&self) -> Option<&str> {
        self.remote_file_id.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.file_name.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.state == SlotState::Ready
    }

    /// Re-selecting a file always starts over: the previous remote id is dropped.
    pub(crate) fn begin_upload(&mut self, file: SelectedFile) -> UploadAttempt {
        self.attempt += 1;
        self.file = Some(file);
        self.remote_file_id = None;
        self.state = SlotState::Uploading;
        self.attempt
    }

    /// Returns false when the response belongs to a superseded attempt.
    pub(crate) fn mark_ready(&mut self, attempt: UploadAttempt, file_id: String) -> bool {
        if !self.accepts(attempt) {
            return false;
        }
        self.remote_file_id = Some(file_id);
        self.state = SlotState::Ready;
        true
    }

    pub(crate) fn mark_failed(&mut self, attempt: UploadAttempt) -> bool {
        if !self.accepts(attempt) {
            return false;
        }
        self.remote_file_id = None;
        self.state = SlotState::Failed;
        true
    }

    fn accepts(&self, attempt: UploadAttempt) -> bool {
        self.state == SlotState::Uploading && self.attempt == attempt
    }
}

/// Rejects a file whose name lacks the slot's extension. Runs before any
/// network call.
pub fn validate_file_name(file_name: &str, kind: SlotKind) -> Result<(), InspectionError> {
    let expected = kind.required_extension();
    let matches = file_name.len() > expected.len()
        && file_name
            .get(file_name.len() - expected.len()..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case(expected));
    if matches {
        Ok(())
    } else {
        Err(InspectionError::InvalidFileType {
            file_name: file_name.to_string(),
            expected,
        })
    }
}
