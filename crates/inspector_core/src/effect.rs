use std::path::PathBuf;

use crate::{SlotKind, TaskId, TaskRequest, UploadAttempt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadFile {
        slot: SlotKind,
        attempt: UploadAttempt,
        path: PathBuf,
    },
    StartTask { request: TaskRequest },
    OpenStream { task_id: TaskId },
    /// Safe to issue for a stream that is already gone.
    CloseStream { task_id: TaskId },
    DownloadResult {
        task_id: TaskId,
        download_url: String,
    },
}
