use std::path::PathBuf;

use clap::Parser;

use crate::types::PageId;

/// Interactive shell over a single slotted page.
#[derive(Parser, Debug, Clone)]
#[command(name = "heapslot", version, about = "Inspect and edit a slotted heap page")]
pub struct ShellConfig {
    /// Page id the shell's page is initialized with
    #[arg(short = 'p', long, default_value_t = 1, env = "HEAPSLOT_PAGE_ID")]
    pub page_id: PageId,

    /// Page image to load on startup instead of starting empty
    #[arg(short = 'f', long, value_name = "FILE")]
    pub page_file: Option<PathBuf>,

    /// Command history file
    #[arg(long, default_value = ".heapslot_history", env = "HEAPSLOT_HISTORY")]
    pub history: PathBuf,

    /// Do not read or write the history file
    #[arg(long)]
    pub no_history: bool,

    /// Log filter, e.g. "warn" or "heapslot=debug"
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    pub log_level: String,
}
