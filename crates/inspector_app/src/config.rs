//! RON configuration file for the inspector binary.
//!
//! Every field is optional; command-line flags win over file values.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Args;

pub const DEFAULT_CONFIG_FILE: &str = "./inspector.ron";
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub connect_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub download_results: bool,
    pub model_name: Option<String>,
    pub max_concurrency: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            connect_timeout_secs: 10,
            output_dir: PathBuf::from("output"),
            download_results: true,
            model_name: None,
            max_concurrency: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl AppConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(api_base) = &args.api_base {
            self.api_base = api_base.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            self.output_dir = output_dir.clone();
        }
        if args.no_download {
            self.download_results = false;
        }
        self
    }
}

/// Loads `explicit` when given (it must exist), otherwise the default file
/// if present, otherwise built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config = parse(&content).map_err(|message| ConfigError::Parse {
        path: path.clone(),
        message,
    })?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn parse(content: &str) -> Result<AppConfig, String> {
    if content.trim().is_empty() {
        engine_warn!("Config file is empty; using defaults");
        return Ok(AppConfig::default());
    }
    ron::from_str(content).map_err(|err| err.to_string())
}
