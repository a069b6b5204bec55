use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "inspector")]
#[command(about = "Upload a source/target workbook pair and follow a translation inspection")]
#[command(version)]
pub struct Args {
    /// RON config file (defaults to ./inspector.ron when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the inspection API, e.g. http://localhost:8000/api
    #[arg(long, env = "INSPECTOR_API_BASE")]
    pub api_base: Option<String>,

    /// Source workbook (.xlsx)
    #[arg(short, long)]
    pub source: PathBuf,

    /// Target workbook (.xlsx)
    #[arg(short, long, required_unless_present = "list_sheets")]
    pub target: Option<PathBuf>,

    /// Optional glossary (.csv)
    #[arg(short, long)]
    pub glossary: Option<PathBuf>,

    /// Sheet to inspect; repeat for several. All sheets when omitted.
    #[arg(long = "sheet")]
    pub sheets: Vec<String>,

    /// Per-sheet language settings as a JSON object
    #[arg(long, conflicts_with = "sheet_config_file")]
    pub sheet_config: Option<String>,

    /// Read the per-sheet language JSON from a file
    #[arg(long)]
    pub sheet_config_file: Option<PathBuf>,

    /// Cell range to inspect (default C7:C28)
    #[arg(long)]
    pub cell_range: Option<String>,

    /// Directory for downloaded results
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not fetch the result file after completion
    #[arg(long)]
    pub no_download: bool,

    /// Upload the source file, print its sheets and exit
    #[arg(long)]
    pub list_sheets: bool,

    /// Log file path (default ./inspector.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}
