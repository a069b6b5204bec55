use std::sync::Once;

use inspector_core::{
    parse_sheet_config, resolve_cell_range, update, AppState, Effect, InspectionError, Msg,
    SelectedFile, SlotKind, TaskRequest, UploadReceipt, DEFAULT_CELL_RANGE, EMPTY_SHEET_CONFIG,
};
use pretty_assertions::assert_eq;
use serde_json::json;

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
    let attempt = match effects.as_slice() {
        [Effect::UploadFile { attempt, .. }] => *attempt,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            slot,
            attempt,
            result: Ok(UploadReceipt {
                file_id: file_id.to_string(),
                sheets: sheets.iter().map(|s| s.to_string()).collect(),
            }),
        },
    );
    state
}

fn ready_state() -> AppState {
    let state = upload(
        AppState::new(),
        SlotKind::Source,
        "source.xlsx",
        "src_1.xlsx",
        &["Main", "UI", "Credits"],
    );
    upload(state, SlotKind::Target, "target.xlsx", "tgt_1.xlsx", &[])
}

fn start_request(effects: &[Effect]) -> Option<&TaskRequest> {
    effects.iter().find_map(|effect| match effect {
        Effect::StartTask { request } => Some(request),
        _ => None,
    })
}

#[test]
fn start_builds_request_with_defaults() {
    init_logging();
    let (state, effects) = update(ready_state(), Msg::StartClicked);

    assert_eq!(
        start_request(&effects),
        Some(&TaskRequest {
            source_file_id: "src_1.xlsx".to_string(),
            target_file_id: "tgt_1.xlsx".to_string(),
            sheets: vec!["Main".to_string(), "UI".to_string(), "Credits".to_string()],
            sheet_langs: Default::default(),
            glossary_file_id: None,
            cell_range: DEFAULT_CELL_RANGE.to_string(),
        })
    );
    let view = state.view();
    assert!(view.launcher.in_flight);
    assert!(!view.launcher.enabled);
    assert_eq!(view.launcher.label, "Processing...");
}

#[test]
fn blank_cell_range_defaults_and_other_input_is_forwarded() {
    init_logging();
    assert_eq!(resolve_cell_range(""), "C7:C28");
    assert_eq!(resolve_cell_range("   "), "C7:C28");
    assert_eq!(resolve_cell_range(" B2:B9"), " B2:B9");

    let (state, _) = update(ready_state(), Msg::CellRangeChanged("D1:D5".to_string()));
    let (_, effects) = update(state, Msg::StartClicked);
    assert_eq!(start_request(&effects).unwrap().cell_range, "D1:D5");
}

#[test]
fn glossary_id_is_included_once_uploaded() {
    init_logging();
    let state = upload(ready_state(), SlotKind::Glossary, "terms.csv", "glossary_1.csv", &[]);
    let (_, effects) = update(state, Msg::StartClicked);

    assert_eq!(
        start_request(&effects).unwrap().glossary_file_id.as_deref(),
        Some("glossary_1.csv")
    );
}

#[test]
fn sheet_config_is_parsed_into_request() {
    init_logging();
    let text = r#"{"Main": "Korean", "UI": {"lang": "Japanese", "code": "ja_JP"}}"#;
    let (state, _) = update(ready_state(), Msg::SheetConfigChanged(text.to_string()));
    let (_, effects) = update(state, Msg::StartClicked);

    let langs = &start_request(&effects).unwrap().sheet_langs;
    assert_eq!(langs.len(), 2);
    assert_eq!(langs["Main"], json!("Korean"));
    assert_eq!(langs["UI"], json!({"lang": "Japanese", "code": "ja_JP"}));
}

#[test]
fn malformed_config_blocks_submission() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::SheetConfigChanged("{not json".to_string()));
    let (state, effects) = update(state, Msg::StartClicked);

    assert!(effects.is_empty());
    assert!(matches!(
        state.notifications().errors().last(),
        Some(InspectionError::ConfigParseError(_))
    ));
    let view = state.view();
    assert!(!view.launcher.in_flight);
    assert!(view.launcher.enabled);
}

#[test]
fn blank_config_blocks_submission() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::SheetConfigChanged("   ".to_string()));
    let (state, effects) = update(state, Msg::StartClicked);

    assert!(start_request(&effects).is_none());
    assert!(effects.is_empty());
    assert!(matches!(
        state.notifications().errors().last(),
        Some(InspectionError::ConfigParseError(_))
    ));
    assert!(!state.view().launcher.in_flight);
}

#[test]
fn untouched_config_starts_with_no_overrides() {
    init_logging();
    assert_eq!(ready_state().session().sheet_config_text(), EMPTY_SHEET_CONFIG);

    let (_, effects) = update(ready_state(), Msg::StartClicked);
    assert!(start_request(&effects).unwrap().sheet_langs.is_empty());
}

#[test]
fn config_parsing_rejects_blank_and_non_objects() {
    assert!(matches!(
        parse_sheet_config(""),
        Err(InspectionError::ConfigParseError(_))
    ));
    assert!(parse_sheet_config("  {} ").unwrap().is_empty());
    assert!(matches!(
        parse_sheet_config("[\"Main\"]"),
        Err(InspectionError::ConfigParseError(_))
    ));
    assert!(matches!(
        parse_sheet_config("\"Korean\""),
        Err(InspectionError::ConfigParseError(_))
    ));
}

#[test]
fn deselect_all_blocks_submission() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::DeselectAllSheets);
    assert!(state.session().sheets().checked().is_empty());

    let (state, effects) = update(state, Msg::StartClicked);
    assert!(effects.is_empty());
    assert_eq!(
        state.notifications().errors().last(),
        Some(&InspectionError::NoSheetSelected)
    );
}

#[test]
fn select_all_restores_full_set_and_toggle_narrows_it() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::DeselectAllSheets);
    let (state, _) = update(state, Msg::SelectAllSheets);
    assert_eq!(
        state.session().sheets().checked(),
        vec!["Main".to_string(), "UI".to_string(), "Credits".to_string()]
    );

    let (state, _) = update(
        state,
        Msg::SheetToggled {
            name: "UI".to_string(),
            selected: false,
        },
    );
    let (_, effects) = update(state, Msg::StartClicked);
    assert_eq!(
        start_request(&effects).unwrap().sheets,
        vec!["Main".to_string(), "Credits".to_string()]
    );
}

#[test]
fn toggling_unknown_sheet_is_reported() {
    init_logging();
    let (state, _) = update(
        ready_state(),
        Msg::SheetToggled {
            name: "Missing".to_string(),
            selected: true,
        },
    );

    assert_eq!(
        state.notifications().entries().last().unwrap().message,
        "Unknown sheet: Missing"
    );
    assert_eq!(state.session().sheets().checked().len(), 3);
}

#[test]
fn start_is_rejected_before_gate_opens() {
    init_logging();
    let state = upload(AppState::new(), SlotKind::Source, "s.xlsx", "src", &["A"]);
    let (state, effects) = update(state, Msg::StartClicked);

    assert!(effects.is_empty());
    assert_eq!(
        state.notifications().errors().last(),
        Some(&InspectionError::NotReady)
    );
}

#[test]
fn second_submission_is_rejected_while_in_flight() {
    init_logging();
    let (state, first) = update(ready_state(), Msg::StartClicked);
    assert!(start_request(&first).is_some());

    let (state, second) = update(state, Msg::StartClicked);
    assert!(second.is_empty());
    assert_eq!(
        state.notifications().errors().last(),
        Some(&InspectionError::SubmissionInFlight)
    );
}

#[test]
fn start_error_re_enables_submission() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::StartClicked);
    let (state, effects) = update(
        state,
        Msg::TaskStartFailed {
            message: "{\"detail\":\"model_name missing\"}".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.launcher.enabled);
    assert_eq!(view.launcher.label, "Start Inspection");
    assert_eq!(
        state.notifications().entries().last().unwrap().message,
        "Failed to start: {\"detail\":\"model_name missing\"}"
    );
}

#[test]
fn task_started_opens_stream() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::StartClicked);
    let (state, effects) = update(
        state,
        Msg::TaskStarted {
            task_id: "task-1".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::OpenStream {
            task_id: "task-1".to_string()
        }]
    );
    assert_eq!(state.view().task_id.as_deref(), Some("task-1"));
}

#[test]
fn task_started_without_submission_is_ignored() {
    init_logging();
    let (state, effects) = update(
        ready_state(),
        Msg::TaskStarted {
            task_id: "ghost".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().task_id, None);
}
