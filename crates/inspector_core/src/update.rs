use std::path::PathBuf;

use crate::launcher::build_request;
use crate::{
    is_ready, validate_file_name, AppState, DownloadState, Effect, InspectionError, LaunchLabel,
    Msg, ProgressState, ProgressStream, SelectedFile, Severity, SlotKind, StreamInput,
    StreamIntent, TaskId, TerminalOutcome, UploadAttempt, UploadReceipt,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { slot, file } => select_file(&mut state, slot, file),
        Msg::UploadFinished {
            slot,
            attempt,
            result,
        } => {
            finish_upload(&mut state, slot, attempt, result);
            Vec::new()
        }
        Msg::SheetToggled { name, selected } => {
            if !state.session.sheets.set_selected(&name, selected) {
                state
                    .log
                    .push(Severity::Error, format!("Unknown sheet: {name}"));
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectAllSheets => {
            state.session.sheets.select_all();
            state.log.push(Severity::Info, "All sheets selected.");
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeselectAllSheets => {
            state.session.sheets.deselect_all();
            state.log.push(Severity::Info, "All sheets deselected.");
            state.mark_dirty();
            Vec::new()
        }
        Msg::SheetConfigChanged(text) => {
            state.session.sheet_config_text = text;
            Vec::new()
        }
        Msg::CellRangeChanged(text) => {
            state.session.cell_range_text = text;
            Vec::new()
        }
        Msg::StartClicked => start_task(&mut state),
        Msg::TaskStarted { task_id } => attach_stream(&mut state, task_id),
        Msg::TaskStartFailed { message } => {
            if state.launcher.in_flight() && state.stream.is_none() {
                state.log.push_error(InspectionError::StartError(message));
                state.launcher.settle(LaunchLabel::Start);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StreamOpened { task_id } => feed_stream(&mut state, &task_id, StreamInput::Opened),
        Msg::StreamMessage { task_id, payload } => {
            feed_stream(&mut state, &task_id, StreamInput::Message(payload))
        }
        Msg::StreamLost { task_id, reason } => {
            feed_stream(&mut state, &task_id, StreamInput::TransportFailed(reason))
        }
        Msg::ResultDownloaded { task_id, result } => {
            finish_download(&mut state, task_id, result);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn select_file(state: &mut AppState, slot: SlotKind, file: SelectedFile) -> Vec<Effect> {
    if let Err(err) = validate_file_name(&file.file_name, slot) {
        state.log.push_error(err);
        state.mark_dirty();
        return Vec::new();
    }

    state.log.push(
        Severity::System,
        format!("Uploading {slot} file: {}...", file.file_name),
    );
    let path = file.path.clone();
    let attempt = state.session.slot_mut(slot).begin_upload(file);
    state.mark_dirty();
    vec![Effect::UploadFile {
        slot,
        attempt,
        path,
    }]
}

fn finish_upload(
    state: &mut AppState,
    slot: SlotKind,
    attempt: UploadAttempt,
    result: Result<UploadReceipt, String>,
) {
    match result {
        Ok(receipt) => {
            if !state.session.slot_mut(slot).mark_ready(attempt, receipt.file_id) {
                return;
            }
            if slot == SlotKind::Source {
                if receipt.sheets.is_empty() {
                    state.session.sheets.replace(Vec::<String>::new());
                    state.log.push_error(InspectionError::NoSheetsFound);
                } else {
                    state.session.sheets.replace(receipt.sheets);
                    state.log.push(
                        Severity::Success,
                        format!(
                            "Source analysis complete. Found {} sheets.",
                            state.session.sheets.len()
                        ),
                    );
                }
            }
            state
                .log
                .push(Severity::Success, format!("{slot} upload complete."));
        }
        Err(message) => {
            if !state.session.slot_mut(slot).mark_failed(attempt) {
                return;
            }
            state
                .log
                .push_error(InspectionError::UploadError { slot, message });
        }
    }

    if is_ready(&state.session) {
        state.log.push(Severity::Info, "Ready to start inspection.");
    }
    state.mark_dirty();
}

fn start_task(state: &mut AppState) -> Vec<Effect> {
    if state.launcher.in_flight() {
        state.log.push_error(InspectionError::SubmissionInFlight);
        state.mark_dirty();
        return Vec::new();
    }
    if !is_ready(&state.session) {
        state.log.push_error(InspectionError::NotReady);
        state.mark_dirty();
        return Vec::new();
    }

    let request = match build_request(&state.session) {
        Ok(request) => request,
        Err(err) => {
            state.log.push_error(err);
            state.mark_dirty();
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = state.stream.take() {
        effects.push(Effect::CloseStream {
            task_id: previous.task_id().to_string(),
        });
    }
    state.launcher.begin();
    state.progress = ProgressState::default();
    state.outcome = None;
    state.last_phase = None;
    state.download = DownloadState::Idle;
    state
        .log
        .push(Severity::System, "Starting inspection task...");
    state.mark_dirty();
    effects.push(Effect::StartTask { request });
    effects
}

fn attach_stream(state: &mut AppState, task_id: TaskId) -> Vec<Effect> {
    if !state.launcher.in_flight() {
        return Vec::new();
    }
    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = state.stream.take() {
        effects.push(Effect::CloseStream {
            task_id: previous.task_id().to_string(),
        });
    }
    state
        .log
        .push(Severity::System, format!("Task {task_id} accepted."));
    state.stream = Some(ProgressStream::new(task_id.clone()));
    state.mark_dirty();
    effects.push(Effect::OpenStream { task_id });
    effects
}

fn feed_stream(state: &mut AppState, task_id: &str, input: StreamInput) -> Vec<Effect> {
    let Some(stream) = state.stream.take() else {
        return Vec::new();
    };
    if stream.task_id() != task_id {
        state.stream = Some(stream);
        return Vec::new();
    }

    let (stream, intents) = stream.handle(input);
    let phase = stream.phase();
    state.last_phase = Some(phase);
    state.stream = Some(stream);
    state.mark_dirty();

    let mut effects = Vec::new();
    for intent in intents {
        match intent {
            StreamIntent::Notify { severity, message } => state.log.push(severity, message),
            StreamIntent::Report(err) => state.log.push_error(err),
            StreamIntent::UpdateProgress {
                current,
                total,
                percent,
                log,
            } => {
                state.progress.current = current;
                state.progress.total = total;
                state.progress.percent = percent;
                if log.is_some() {
                    state.progress.last_log_message = log;
                }
            }
            StreamIntent::Close(outcome) => {
                state.stream = None;
                effects.push(Effect::CloseStream {
                    task_id: task_id.to_string(),
                });
                let label = match &outcome {
                    TerminalOutcome::Completed { download_url } => {
                        if state.download_results {
                            state.download = DownloadState::Pending {
                                task_id: task_id.to_string(),
                            };
                            effects.push(Effect::DownloadResult {
                                task_id: task_id.to_string(),
                                download_url: download_url.clone(),
                            });
                        }
                        LaunchLabel::StartNew
                    }
                    TerminalOutcome::Failed { .. } | TerminalOutcome::Disconnected => {
                        LaunchLabel::Retry
                    }
                };
                state.launcher.settle(label);
                state.outcome = Some(outcome);
            }
        }
    }
    effects
}

fn finish_download(state: &mut AppState, task_id: TaskId, result: Result<PathBuf, String>) {
    match &state.download {
        DownloadState::Pending { task_id: pending } if *pending == task_id => {}
        _ => return,
    }
    state.download = match result {
        Ok(path) => {
            state.log.push(
                Severity::Success,
                format!("Result saved to {}", path.display()),
            );
            DownloadState::Saved(path)
        }
        Err(message) => {
            state
                .log
                .push_error(InspectionError::DownloadError(message.clone()));
            DownloadState::Failed(message)
        }
    };
    state.mark_dirty();
}
