use crate::SlotKind;

/// Every failure the workflow can surface. Each one scopes to the current
/// attempt; none of them ends the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InspectionError {
    #[error("Invalid file type: {file_name}. Please upload {expected}")]
    InvalidFileType {
        file_name: String,
        expected: &'static str,
    },
    #[error("{slot} upload failed: {message}")]
    UploadError { slot: SlotKind, message: String },
    #[error("No sheets found in Source file. Ensure the Excel file contains readable data.")]
    NoSheetsFound,
    #[error("Invalid JSON in configuration: {0}")]
    ConfigParseError(String),
    #[error("Please select at least one sheet.")]
    NoSheetSelected,
    #[error("Upload both source and target files before starting.")]
    NotReady,
    #[error("An inspection task is already running.")]
    SubmissionInFlight,
    #[error("Failed to start: {0}")]
    StartError(String),
    #[error("Error: {0}")]
    StreamFailed(String),
    #[error("Stream connection lost")]
    StreamDisconnected,
    #[error("Result download failed: {0}")]
    DownloadError(String),
}
