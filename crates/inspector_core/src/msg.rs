use std::path::PathBuf;

use crate::{SelectedFile, SlotKind, TaskId, UploadAttempt, UploadReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file for a slot.
    FileSelected { slot: SlotKind, file: SelectedFile },
    /// Upload endpoint answered (or the transport failed) for an attempt.
    UploadFinished {
        slot: SlotKind,
        attempt: UploadAttempt,
        result: Result<UploadReceipt, String>,
    },
    /// User ticked or unticked one sheet.
    SheetToggled { name: String, selected: bool },
    SelectAllSheets,
    DeselectAllSheets,
    /// User edited the per-sheet language JSON.
    SheetConfigChanged(String),
    /// User edited the cell range field.
    CellRangeChanged(String),
    /// User clicked Start / Retry.
    StartClicked,
    /// Start endpoint accepted the request.
    TaskStarted { task_id: TaskId },
    /// Start endpoint rejected the request; `message` is the body verbatim.
    TaskStartFailed { message: String },
    /// Event stream connected.
    StreamOpened { task_id: TaskId },
    /// One `data:` payload from the event stream.
    StreamMessage { task_id: TaskId, payload: String },
    /// Transport dropped, refused or ended the stream.
    StreamLost { task_id: TaskId, reason: String },
    /// Result file for a completed task was fetched and saved (or not).
    ResultDownloaded {
        task_id: TaskId,
        result: Result<PathBuf, String>,
    },
    /// Render tick.
    Tick,
}
