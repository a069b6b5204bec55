use std::io::{self, Write};

use inspector_core::{AppState, Notification, ProgressState, Severity};

/// Prints only what changed since the previous render.
#[derive(Debug, Default)]
pub struct Renderer {
    printed: usize,
    last_progress: Option<ProgressState>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, state: &AppState, out: &mut impl Write) -> io::Result<()> {
        let log = state.notifications();
        for entry in log.since(self.printed) {
            writeln!(out, "{}", format_notification(entry))?;
        }
        self.printed = log.len();

        let view = state.view();
        let changed = self.last_progress.as_ref() != Some(&view.progress);
        if changed && view.progress.total > 0 {
            writeln!(out, "{}", format_progress(&view.progress))?;
        }
        self.last_progress = Some(view.progress);
        out.flush()
    }
}

pub fn format_notification(entry: &Notification) -> String {
    let marker = match entry.severity {
        Severity::Error => "ERROR ",
        Severity::Info | Severity::System | Severity::Success => "",
    };
    format!("[{}] {marker}{}", entry.at.format("%H:%M:%S"), entry.message)
}

pub fn format_progress(progress: &ProgressState) -> String {
    let line = format!("{} ({})", progress.count_label(), progress.percent_label());
    match &progress.last_log_message {
        Some(message) => format!("{line} {message}"),
        None => line,
    }
}
