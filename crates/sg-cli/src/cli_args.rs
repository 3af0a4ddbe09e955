use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sg-cli")]
#[command(about = "Story graph extraction, analysis and script rewriting")]
pub(crate) struct Cli {
    /// Log debug events to stderr.
    #[arg(long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Parse script files and commit dialogue and edges to the store.
    Extract(ExtractArgs),
    /// Load translated dialogue from a JSON array into the store.
    ImportTranslations(ImportTranslationsArgs),
    /// Write translated copies of the scripts.
    Rewrite(RewriteArgs),
    /// Report cycles in the story graph.
    Cycles(CyclesArgs),
    /// Cheapest route between two threads, weighted by dialogue count.
    Path(PathArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ExtractArgs {
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: PathBuf,
    #[arg(long = "store")]
    pub(crate) store: PathBuf,
    #[arg(long = "config")]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct ImportTranslationsArgs {
    #[arg(long = "store")]
    pub(crate) store: PathBuf,
    #[arg(long = "file")]
    pub(crate) file: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct RewriteArgs {
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: PathBuf,
    #[arg(long = "out-dir")]
    pub(crate) out_dir: PathBuf,
    #[arg(long = "store")]
    pub(crate) store: PathBuf,
    #[arg(long = "font")]
    pub(crate) font: PathBuf,
    #[arg(long = "speakers")]
    pub(crate) speakers: Option<PathBuf>,
    #[arg(long = "config")]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct CyclesArgs {
    #[arg(long = "store")]
    pub(crate) store: PathBuf,
    #[arg(long = "max-cycles", default_value_t = 200)]
    pub(crate) max_cycles: usize,
    #[arg(long = "max-scc-size", default_value_t = 500)]
    pub(crate) max_scc_size: usize,
    #[arg(long = "show-choices")]
    pub(crate) show_choices: bool,
}

#[derive(Debug, Args)]
pub(crate) struct PathArgs {
    #[arg(long = "store")]
    pub(crate) store: PathBuf,
    #[arg(
        long = "start",
        num_args = 2,
        value_names = ["SCRIPT_ID", "THREAD"],
        default_values = ["99", "sure1"]
    )]
    pub(crate) start: Vec<String>,
    #[arg(
        long = "end",
        num_args = 2,
        value_names = ["SCRIPT_ID", "THREAD"],
        default_values = ["9100", "sure1"]
    )]
    pub(crate) end: Vec<String>,
}
