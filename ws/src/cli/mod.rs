// CLI argument parsing and definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Print how each target resolves to a WorkSpace ID
    Resolve,
    /// Start STOPPED WorkSpaces
    Start,
    /// Stop AVAILABLE WorkSpaces
    Stop,
    /// List the user assigned to each WorkSpace
    Users,
    /// List the current state of each WorkSpace
    Status,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Resolve => "resolve",
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Users => "users",
            Action::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ws")]
#[command(about = "Amazon WorkSpaces bulk helper")]
#[command(version)]
pub struct Args {
    /// Comma-separated WorkSpace names, IDs or user names
    #[arg(long)]
    pub names: Option<String>,

    /// File with WorkSpace names (comma-separated or one per line)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// What to do with the matched WorkSpaces
    #[arg(long, value_enum)]
    pub action: Action,

    /// AWS CLI profile
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// Show what would happen without starting or stopping anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also try to resolve by Name tag
    #[arg(long)]
    pub include_tags: bool,

    /// Cap DescribeTags calls when --include-tags is set
    #[arg(long, default_value_t = 500)]
    pub max_tag_lookups: usize,

    /// Directory for per-run log files
    #[arg(long, env = "WS_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}
