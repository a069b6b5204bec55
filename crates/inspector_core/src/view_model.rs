use crate::{
    DownloadState, ProgressState, SheetEntry, SlotKind, SlotState, StreamPhase, TerminalOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub slots: Vec<SlotView>,
    pub ready: bool,
    pub sheets: Vec<SheetEntry>,
    pub launcher: LauncherView,
    pub progress: ProgressState,
    pub percent_label: String,
    pub count_label: String,
    pub task_id: Option<String>,
    pub stream_phase: Option<StreamPhase>,
    pub outcome: Option<TerminalOutcome>,
    pub download_url: Option<String>,
    pub download: DownloadState,
    pub notification_count: usize,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn slot(&self, kind: SlotKind) -> Option<&SlotView> {
        self.slots.iter().find(|slot| slot.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub kind: SlotKind,
    pub state: SlotState,
    pub file_name: Option<String>,
    pub remote_file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LauncherView {
    pub enabled: bool,
    pub in_flight: bool,
    pub label: &'static str,
}
