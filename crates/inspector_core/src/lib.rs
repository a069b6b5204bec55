//! Inspector core: pure workflow state machine and view-model helpers.
mod effect;
mod error;
mod launcher;
mod msg;
mod notify;
mod session;
mod sheets;
mod slot;
mod state;
mod stream;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::InspectionError;
pub use launcher::{
    build_request, collect_config, collect_sheets, parse_sheet_config, resolve_cell_range,
    LaunchLabel, Launcher, SheetConfig, TaskRequest, DEFAULT_CELL_RANGE,
};
pub use msg::Msg;
pub use notify::{Notification, NotificationLog, Severity};
pub use session::{is_ready, Session, EMPTY_SHEET_CONFIG};
pub use sheets::{SheetEntry, SheetSelection};
pub use slot::{
    validate_file_name, SelectedFile, SlotKind, SlotState, UploadAttempt, UploadReceipt,
    UploadSlot,
};
pub use state::{AppState, DownloadState};
pub use stream::{
    ProgressState, ProgressStream, StreamEvent, StreamInput, StreamIntent, StreamPhase, TaskId,
    TerminalOutcome,
};
pub use update::update;
pub use view_model::{AppViewModel, LauncherView, SlotView};
