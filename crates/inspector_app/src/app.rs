use std::fs;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use inspector_core::{
    update, AppState, DownloadState, Msg, SelectedFile, SlotKind, SlotState, TerminalOutcome,
    EMPTY_SHEET_CONFIG,
};
use inspector_engine::{ApiEndpoints, ClientSettings, EngineConfig, EngineHandle};

use crate::cli::Args;
use crate::config::{self, AppConfig};
use crate::effects::{EffectRunner, ModelSettings};
use crate::render::Renderer;

const PUMP_INTERVAL: Duration = Duration::from_millis(75);

pub fn run(args: Args) -> Result<ExitCode> {
    let config = config::load(args.config.as_deref())
        .context("loading configuration")?
        .with_overrides(&args);
    engine_info!("Using API base {}", config.api_base);

    let engine = build_engine(&config)?;
    let runner = EffectRunner::new(
        engine,
        ModelSettings {
            model_name: config.model_name.clone(),
            max_concurrency: config.max_concurrency,
        },
    );
    let mut state = AppState::new();
    if config.download_results {
        state = state.with_result_download();
    }

    let mut driver = Driver {
        state,
        runner,
        renderer: Renderer::new(),
        out: io::stdout(),
    };
    driver.run(&args)
}

fn build_engine(config: &AppConfig) -> Result<EngineHandle> {
    let endpoints = ApiEndpoints::parse(&config.api_base)
        .with_context(|| format!("invalid api_base {:?}", config.api_base))?;
    let mut client = ClientSettings::new(endpoints);
    client.connect_timeout = config.connect_timeout();

    let engine = EngineHandle::new(EngineConfig {
        client,
        output_dir: config
            .download_results
            .then(|| config.output_dir.clone()),
    })
    .context("starting network engine")?;
    Ok(engine)
}

struct Driver {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    out: Stdout,
}

impl Driver {
    fn run(&mut self, args: &Args) -> Result<ExitCode> {
        self.dispatch(Msg::SheetConfigChanged(sheet_config_text(args)?))?;
        if let Some(range) = &args.cell_range {
            self.dispatch(Msg::CellRangeChanged(range.clone()))?;
        }

        for (slot, path) in selected_files(args) {
            self.dispatch(Msg::FileSelected {
                slot,
                file: SelectedFile::from_path(path),
            })?;
        }
        self.pump_until(|state| {
            SlotKind::ALL
                .iter()
                .all(|kind| state.session().slot(*kind).state() != SlotState::Uploading)
        })?;

        if args.list_sheets {
            return self.print_sheets();
        }

        let missing: Vec<SlotKind> = SlotKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_mandatory() && !self.state.session().slot(*kind).is_ready())
            .collect();
        if !missing.is_empty() {
            engine_warn!("Not starting; slots not ready: {:?}", missing);
            return Ok(ExitCode::FAILURE);
        }

        if !args.sheets.is_empty() {
            self.dispatch(Msg::DeselectAllSheets)?;
            for name in &args.sheets {
                self.dispatch(Msg::SheetToggled {
                    name: name.clone(),
                    selected: true,
                })?;
            }
        }

        self.dispatch(Msg::StartClicked)?;
        if !self.state.view().launcher.in_flight {
            return Ok(ExitCode::FAILURE);
        }
        self.pump_until(|state| {
            let view = state.view();
            !view.launcher.in_flight && !matches!(view.download, DownloadState::Pending { .. })
        })?;

        let view = self.state.view();
        match view.outcome {
            Some(TerminalOutcome::Completed { download_url }) => {
                if matches!(view.download, DownloadState::Idle) {
                    writeln!(self.out, "Result available at {download_url}")?;
                }
                Ok(ExitCode::SUCCESS)
            }
            _ => Ok(ExitCode::FAILURE),
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.renderer
                .render(&state, &mut self.out)
                .context("writing to stdout")?;
        }
        self.state = state;
        self.runner.enqueue(effects);
        Ok(())
    }

    fn pump_until(&mut self, done: impl Fn(&AppState) -> bool) -> Result<()> {
        while !done(&self.state) {
            let msg = self
                .runner
                .next_msg(PUMP_INTERVAL)
                .context("waiting for network engine")?
                .unwrap_or(Msg::Tick);
            self.dispatch(msg)?;
        }
        Ok(())
    }

    fn print_sheets(&mut self) -> Result<ExitCode> {
        if !self.state.session().slot(SlotKind::Source).is_ready() {
            return Ok(ExitCode::FAILURE);
        }
        for entry in self.state.session().sheets().entries() {
            writeln!(self.out, "{}", entry.name)?;
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn selected_files(args: &Args) -> Vec<(SlotKind, PathBuf)> {
    let mut files = vec![(SlotKind::Source, args.source.clone())];
    if let Some(target) = &args.target {
        files.push((SlotKind::Target, target.clone()));
    }
    if let Some(glossary) = &args.glossary {
        files.push((SlotKind::Glossary, glossary.clone()));
    }
    files
}

/// Inline text wins over a file; with neither, no per-sheet overrides.
fn sheet_config_text(args: &Args) -> Result<String> {
    if let Some(text) = &args.sheet_config {
        return Ok(text.clone());
    }
    match &args.sheet_config_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading sheet config {}", path.display())),
        None => Ok(EMPTY_SHEET_CONFIG.to_string()),
    }
}
