use std::{collections::HashSet, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "filebrain",
    about = "Local BM25 keyword search over your own files"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crawl directories and (re)build the search index
    Index(IndexArgs),
    /// Search the index for a query
    Find(FindArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Directories to scan; defaults to your Downloads, Documents, and
    /// Desktop folders
    pub roots: Vec<PathBuf>,

    /// Path to a JSON file with additional ignore names
    #[arg(long)]
    pub ignore_config: Option<PathBuf>,

    /// Restrict indexing to these file extensions (e.g. --extensions pdf docx)
    #[arg(long, num_args = 1..)]
    pub extensions: Vec<String>,

    /// OCR backend to use when native PDF text extraction comes up empty
    /// (e.g. tesseract)
    #[arg(long)]
    pub ocr: Option<String>,

    /// BM25 term-frequency saturation parameter
    #[arg(long, default_value_t = 1.5)]
    pub k1: f64,

    /// BM25 length-normalization parameter
    #[arg(long, default_value_t = 0.75)]
    pub b: f64,
}

impl IndexArgs {
    /// Lower-cased extension allow-list with leading dots, or `None` when
    /// every extension is accepted.
    pub fn extension_filter(&self) -> Option<HashSet<String>> {
        if self.extensions.is_empty() {
            return None;
        }
        Some(
            self.extensions
                .iter()
                .map(|ext| {
                    let ext = ext.to_lowercase();
                    if ext.starts_with('.') {
                        ext
                    } else {
                        format!(".{ext}")
                    }
                })
                .collect(),
        )
    }
}

#[derive(Debug, Parser)]
pub struct FindArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short, long, default_value_t = 25)]
    pub k: usize,

    /// Do not re-sort results by modification time for "latest"-style
    /// queries
    #[arg(long)]
    pub no_recency_boost: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "filebrain",
            &mut std::io::stdout(),
        );
    }
}
