use std::collections::BTreeMap;

use serde_json::Value;

use crate::{InspectionError, Session, SlotKind};

pub const DEFAULT_CELL_RANGE: &str = "C7:C28";

/// Per-sheet language settings, keyed by sheet name. Values are passed
/// through to the server untouched.
pub type SheetConfig = BTreeMap<String, Value>;

/// The start request as the core sees it; the engine owns the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub source_file_id: String,
    pub target_file_id: String,
    pub sheets: Vec<String>,
    pub sheet_langs: SheetConfig,
    pub glossary_file_id: Option<String>,
    pub cell_range: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchLabel {
    #[default]
    Start,
    Processing,
    StartNew,
    Retry,
}

impl LaunchLabel {
    pub fn text(self) -> &'static str {
        match self {
            LaunchLabel::Start => "Start Inspection",
            LaunchLabel::Processing => "Processing...",
            LaunchLabel::StartNew => "Start New Inspection",
            LaunchLabel::Retry => "Retry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Launcher {
    pub(crate) in_flight: bool,
    pub(crate) label: LaunchLabel,
}

impl Launcher {
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn label(&self) -> LaunchLabel {
        self.label
    }

    pub(crate) fn begin(&mut self) {
        self.in_flight = true;
        self.label = LaunchLabel::Processing;
    }

    pub(crate) fn settle(&mut self, label: LaunchLabel) {
        self.in_flight = false;
        self.label = label;
    }
}

/// Parses the free-form sheet configuration. It must be a JSON object; blank
/// text is not valid JSON and is rejected like any other parse failure.
pub fn parse_sheet_config(text: &str) -> Result<SheetConfig, InspectionError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(InspectionError::ConfigParseError(format!(
            "expected an object mapping sheet names to languages, got {}",
            json_kind(&other)
        ))),
        Err(err) => Err(InspectionError::ConfigParseError(err.to_string())),
    }
}

/// Blank input falls back to the default range; anything else is sent as typed.
pub fn resolve_cell_range(input: &str) -> String {
    if input.trim().is_empty() {
        DEFAULT_CELL_RANGE.to_string()
    } else {
        input.to_string()
    }
}

pub fn collect_config(session: &Session) -> Result<SheetConfig, InspectionError> {
    parse_sheet_config(session.sheet_config_text())
}

pub fn collect_sheets(session: &Session) -> Result<Vec<String>, InspectionError> {
    let checked = session.sheets().checked();
    if checked.is_empty() {
        Err(InspectionError::NoSheetSelected)
    } else {
        Ok(checked)
    }
}

/// Validates the session and assembles the request. Order matches what the
/// user sees first: configuration text, then sheet selection.
pub fn build_request(session: &Session) -> Result<TaskRequest, InspectionError> {
    let (Some(source_file_id), Some(target_file_id)) = (
        session.slot(SlotKind::Source).remote_file_id(),
        session.slot(SlotKind::Target).remote_file_id(),
    ) else {
        return Err(InspectionError::NotReady);
    };
    let sheet_langs = collect_config(session)?;
    let sheets = collect_sheets(session)?;
    let glossary = session.slot(SlotKind::Glossary);

    Ok(TaskRequest {
        source_file_id: source_file_id.to_string(),
        target_file_id: target_file_id.to_string(),
        sheets,
        sheet_langs,
        glossary_file_id: glossary
            .is_ready()
            .then(|| glossary.remote_file_id().map(ToOwned::to_owned))
            .flatten(),
        cell_range: resolve_cell_range(session.cell_range_text()),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
