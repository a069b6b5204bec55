use std::path::PathBuf;
use std::sync::Once;

use inspector_core::{
    update, AppState, DownloadState, Effect, InspectionError, Msg, ProgressStream, SelectedFile,
    Severity, SlotKind, StreamInput, StreamIntent, StreamPhase, TerminalOutcome, UploadReceipt,
};

const TASK: &str = "task-42";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn upload(state: AppState, slot: SlotKind, path: &str, file_id: &str, sheets: &[&str]) -> AppState {
    let (state, effects) = update(
        state,
        Msg::FileSelected {
            slot,
            file: SelectedFile::from_path(path),
        },
    );
    let Some(Effect::UploadFile { attempt, .. }) = effects.first() else {
        panic!("expected upload effect, got {effects:?}");
    };
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            slot,
            attempt: *attempt,
            result: Ok(UploadReceipt {
                file_id: file_id.to_string(),
                sheets: sheets.iter().map(|s| s.to_string()).collect(),
            }),
        },
    );
    state
}

/// A state with a submitted task whose stream has just opened.
fn streaming_state(initial: AppState) -> AppState {
    let state = upload(initial, SlotKind::Source, "s.xlsx", "src", &["Main"]);
    let state = upload(state, SlotKind::Target, "t.xlsx", "tgt", &[]);
    let (state, _) = update(state, Msg::StartClicked);
    let (state, _) = update(
        state,
        Msg::TaskStarted {
            task_id: TASK.to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::StreamOpened {
            task_id: TASK.to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().stream_phase, Some(StreamPhase::Streaming));
    state
}

fn message(state: AppState, payload: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::StreamMessage {
            task_id: TASK.to_string(),
            payload: payload.to_string(),
        },
    )
}

fn last_message(state: &AppState) -> String {
    state
        .notifications()
        .entries()
        .last()
        .map(|entry| entry.message.clone())
        .unwrap_or_default()
}

#[test]
fn progress_event_updates_labels() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, effects) = message(state, r#"{"type":"progress","current":3,"total":10,"percent":30}"#);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.percent_label, "30%");
    assert_eq!(view.count_label, "3 / 10");
    assert_eq!(view.stream_phase, Some(StreamPhase::Streaming));
    assert_eq!(view.progress.last_log_message, None);
}

#[test]
fn progress_percent_is_taken_from_server_not_computed() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, _) = message(
        state,
        r#"{"type":"progress","current":1,"total":3,"percent":50,"log":"Sheet Main: row 1"}"#,
    );

    let view = state.view();
    assert_eq!(view.percent_label, "50%");
    assert_eq!(view.progress.last_log_message.as_deref(), Some("Sheet Main: row 1"));
    let last = state.notifications().entries().last().unwrap();
    assert_eq!(last.severity, Severity::System);
    assert_eq!(last.message, "Sheet Main: row 1");
}

#[test]
fn log_event_appends_info_without_state_change() {
    init_logging();
    let state = streaming_state(AppState::new());
    let before = state.view().progress;
    let (state, effects) = message(state, r#"{"type":"log","message":"Loading glossary"}"#);

    assert!(effects.is_empty());
    assert_eq!(state.view().progress, before);
    let last = state.notifications().entries().last().unwrap();
    assert_eq!(last.severity, Severity::Info);
    assert_eq!(last.message, "Loading glossary");
}

#[test]
fn complete_event_closes_stream_and_exposes_download_path() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, effects) = message(state, r#"{"type":"complete","download_url":"/files/abc.xlsx"}"#);

    assert_eq!(
        effects,
        vec![Effect::CloseStream {
            task_id: TASK.to_string()
        }]
    );
    let view = state.view();
    assert_eq!(view.stream_phase, Some(StreamPhase::Completed));
    assert_eq!(view.download_url.as_deref(), Some("/files/abc.xlsx"));
    assert_eq!(
        view.outcome,
        Some(TerminalOutcome::Completed {
            download_url: "/files/abc.xlsx".to_string()
        })
    );
    assert!(view.launcher.enabled);
    assert_eq!(view.launcher.label, "Start New Inspection");
    assert_eq!(view.task_id, None);

    // Anything after closure is ignored.
    let count = state.notifications().len();
    let (state, effects) = message(state, r#"{"type":"log","message":"late"}"#);
    assert!(effects.is_empty());
    assert_eq!(state.notifications().len(), count);
    let (state, effects) = update(
        state,
        Msg::StreamLost {
            task_id: TASK.to_string(),
            reason: "eof".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().stream_phase, Some(StreamPhase::Completed));
}

#[test]
fn complete_requests_download_when_enabled() {
    init_logging();
    let state = streaming_state(AppState::new().with_result_download());
    let (state, effects) = message(state, r#"{"type":"complete","download_url":"/api/download/task-42"}"#);

    assert_eq!(
        effects,
        vec![
            Effect::CloseStream {
                task_id: TASK.to_string()
            },
            Effect::DownloadResult {
                task_id: TASK.to_string(),
                download_url: "/api/download/task-42".to_string(),
            },
        ]
    );
    assert_eq!(
        state.view().download,
        DownloadState::Pending {
            task_id: TASK.to_string()
        }
    );

    let saved = PathBuf::from("output/translation_review_task-42.txt");
    let (state, _) = update(
        state,
        Msg::ResultDownloaded {
            task_id: TASK.to_string(),
            result: Ok(saved.clone()),
        },
    );
    assert_eq!(state.view().download, DownloadState::Saved(saved));
}

#[test]
fn error_event_fails_task_and_offers_retry() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, effects) = message(state, r#"{"type":"error","message":"boom"}"#);

    assert_eq!(
        effects,
        vec![Effect::CloseStream {
            task_id: TASK.to_string()
        }]
    );
    let view = state.view();
    assert_eq!(view.stream_phase, Some(StreamPhase::Failed));
    assert_eq!(
        view.outcome,
        Some(TerminalOutcome::Failed {
            message: "boom".to_string()
        })
    );
    assert!(view.launcher.enabled);
    assert_eq!(view.launcher.label, "Retry");
    assert_eq!(last_message(&state), "Error: boom");
}

#[test]
fn transport_failure_disconnects_without_outcome_from_server() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, _) = message(state, r#"{"type":"progress","current":1,"total":4,"percent":25}"#);
    let (state, effects) = update(
        state,
        Msg::StreamLost {
            task_id: TASK.to_string(),
            reason: "connection reset".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::CloseStream {
            task_id: TASK.to_string()
        }]
    );
    let view = state.view();
    assert_eq!(view.stream_phase, Some(StreamPhase::Disconnected));
    assert_eq!(view.outcome, Some(TerminalOutcome::Disconnected));
    assert!(view.launcher.enabled);
    assert_eq!(view.launcher.label, "Retry");
    assert_eq!(last_message(&state), "Stream connection lost");
    assert_eq!(
        state.notifications().errors().last(),
        Some(&InspectionError::StreamDisconnected)
    );

    // A late terminal event for the dead attempt changes nothing.
    let (state, effects) = message(state, r#"{"type":"complete","download_url":"/x"}"#);
    assert!(effects.is_empty());
    assert_eq!(state.view().outcome, Some(TerminalOutcome::Disconnected));
}

#[test]
fn malformed_and_unknown_events_are_reported_and_ignored() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, effects) = message(state, "not json");
    assert!(effects.is_empty());
    assert!(last_message(&state).starts_with("Malformed stream event ignored"));

    let (state, effects) = message(state, r#"{"type":"heartbeat"}"#);
    assert!(effects.is_empty());
    assert_eq!(state.view().stream_phase, Some(StreamPhase::Streaming));
    assert!(state.view().launcher.in_flight);
}

#[test]
fn events_for_other_tasks_are_ignored() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, effects) = update(
        state,
        Msg::StreamMessage {
            task_id: "other".to_string(),
            payload: r#"{"type":"error","message":"not mine"}"#.to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().stream_phase, Some(StreamPhase::Streaming));
}

#[test]
fn retry_after_failure_starts_fresh_stream() {
    init_logging();
    let state = streaming_state(AppState::new());
    let (state, _) = message(state, r#"{"type":"progress","current":2,"total":4,"percent":50}"#);
    let (state, _) = message(state, r#"{"type":"error","message":"boom"}"#);

    let (state, effects) = update(state, Msg::StartClicked);
    assert!(matches!(effects.as_slice(), [Effect::StartTask { .. }]));
    let view = state.view();
    assert_eq!(view.percent_label, "0%");
    assert_eq!(view.outcome, None);
    assert_eq!(view.stream_phase, None);

    let (state, effects) = update(
        state,
        Msg::TaskStarted {
            task_id: "task-43".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::OpenStream {
            task_id: "task-43".to_string()
        }]
    );
    assert_eq!(state.view().stream_phase, Some(StreamPhase::Connecting));
}

#[test]
fn handler_is_pure_and_terminal_streams_swallow_input() {
    let stream = ProgressStream::new("t");
    assert_eq!(stream.phase(), StreamPhase::Connecting);

    let (stream, intents) = stream.handle(StreamInput::Message(
        r#"{"type":"progress","current":5,"total":5,"percent":100.4}"#.to_string(),
    ));
    assert_eq!(stream.phase(), StreamPhase::Streaming);
    assert_eq!(
        intents,
        vec![StreamIntent::UpdateProgress {
            current: 5,
            total: 5,
            percent: 100,
            log: None,
        }]
    );

    let (stream, intents) = stream.handle(StreamInput::TransportFailed("reset".to_string()));
    assert_eq!(stream.phase(), StreamPhase::Disconnected);
    assert_eq!(
        intents,
        vec![
            StreamIntent::Report(InspectionError::StreamDisconnected),
            StreamIntent::Close(TerminalOutcome::Disconnected),
        ]
    );

    let (stream, intents) = stream.handle(StreamInput::TransportFailed("again".to_string()));
    assert_eq!(stream.phase(), StreamPhase::Disconnected);
    assert!(intents.is_empty());
}
