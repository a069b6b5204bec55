use crate::{SheetSelection, SlotKind, UploadSlot};

/// Initial sheet-language text: valid JSON with no per-sheet overrides.
pub const EMPTY_SHEET_CONFIG: &str = "{}";

/// Everything the user has chosen so far. Owned by `AppState` and handed to
/// the upload, gate and launcher helpers explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    source: UploadSlot,
    target: UploadSlot,
    glossary: UploadSlot,
    pub(crate) sheets: SheetSelection,
    pub(crate) sheet_config_text: String,
    pub(crate) cell_range_text: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            source: UploadSlot::new(SlotKind::Source),
            target: UploadSlot::new(SlotKind::Target),
            glossary: UploadSlot::new(SlotKind::Glossary),
            sheets: SheetSelection::new(),
            sheet_config_text: EMPTY_SHEET_CONFIG.to_string(),
            cell_range_text: String::new(),
        }
    }

    pub fn slot(&self, kind: SlotKind) -> &UploadSlot {
        match kind {
            SlotKind::Source => &self.source,
            SlotKind::Target => &self.target,
            SlotKind::Glossary => &self.glossary,
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: SlotKind) -> &mut UploadSlot {
        match kind {
            SlotKind::Source => &mut self.source,
            SlotKind::Target => &mut self.target,
            SlotKind::Glossary => &mut self.glossary,
        }
    }

    pub fn sheets(&self) -> &SheetSelection {
        &self.sheets
    }

    pub fn sheet_config_text(&self) -> &str {
        &self.sheet_config_text
    }

    pub fn cell_range_text(&self) -> &str {
        &self.cell_range_text
    }
}

/// Readiness gate: source and target uploaded, glossary irrelevant.
pub fn is_ready(session: &Session) -> bool {
    session.slot(SlotKind::Source).is_ready() && session.slot(SlotKind::Target).is_ready()
}
