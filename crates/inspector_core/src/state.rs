use std::path::PathBuf;

use crate::view_model::{AppViewModel, LauncherView, SlotView};
use crate::{
    is_ready, Launcher, NotificationLog, ProgressState, ProgressStream, Session, SlotKind,
    StreamPhase, TaskId, TerminalOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    Idle,
    Pending { task_id: TaskId },
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) session: Session,
    pub(crate) launcher: Launcher,
    /// The live task handle; `None` once a terminal outcome is observed.
    pub(crate) stream: Option<ProgressStream>,
    pub(crate) last_phase: Option<StreamPhase>,
    pub(crate) progress: ProgressState,
    pub(crate) outcome: Option<TerminalOutcome>,
    pub(crate) download: DownloadState,
    pub(crate) download_results: bool,
    pub(crate) log: NotificationLog,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the result file automatically once a task completes.
    pub fn with_result_download(mut self) -> Self {
        self.download_results = true;
        self
    }

    pub fn view(&self) -> AppViewModel {
        let ready = is_ready(&self.session);
        AppViewModel {
            slots: SlotKind::ALL
                .iter()
                .map(|kind| {
                    let slot = self.session.slot(*kind);
                    SlotView {
                        kind: *kind,
                        state: slot.state(),
                        file_name: slot.file_name().map(ToOwned::to_owned),
                        remote_file_id: slot.remote_file_id().map(ToOwned::to_owned),
                    }
                })
                .collect(),
            ready,
            sheets: self.session.sheets().entries().to_vec(),
            launcher: LauncherView {
                enabled: ready && !self.launcher.in_flight(),
                in_flight: self.launcher.in_flight(),
                label: self.launcher.label().text(),
            },
            percent_label: self.progress.percent_label(),
            count_label: self.progress.count_label(),
            progress: self.progress.clone(),
            task_id: self
                .stream
                .as_ref()
                .map(|stream| stream.task_id().to_string()),
            stream_phase: self
                .stream
                .as_ref()
                .map(ProgressStream::phase)
                .or(self.last_phase),
            outcome: self.outcome.clone(),
            download_url: match &self.outcome {
                Some(TerminalOutcome::Completed { download_url }) => Some(download_url.clone()),
                _ => None,
            },
            download: self.download.clone(),
            notification_count: self.log.len(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.log
    }

    pub fn is_ready(&self) -> bool {
        is_ready(&self.session)
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
