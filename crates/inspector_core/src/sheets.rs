/// One sheet discovered in the source workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub selected: bool,
}

/// Ordered set of sheet names, in the order the server reported them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetSelection {
    entries: Vec<SheetEntry>,
}

impl SheetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list; every sheet starts out selected. Duplicate names
    /// keep their first position.
    pub fn replace<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.clear();
        for name in names {
            let name = name.into();
            if self.entries.iter().any(|entry| entry.name == name) {
                continue;
            }
            self.entries.push(SheetEntry {
                name,
                selected: true,
            });
        }
    }

    pub fn select_all(&mut self) {
        self.entries.iter_mut().for_each(|entry| entry.selected = true);
    }

    pub fn deselect_all(&mut self) {
        self.entries
            .iter_mut()
            .for_each(|entry| entry.selected = false);
    }

    /// Returns false if no sheet has that name.
    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn checked(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.selected)
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn entries(&self) -> &[SheetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
