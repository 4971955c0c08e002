use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate Rust error constants and Markdown docs from JSON error definitions"
)]
pub struct GenArgs {
    /// Path to KDL config file (defaults to errz.kdl when present)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// JSON Schema every definition file must satisfy
    #[arg(short = 's', long)]
    pub schema: Option<PathBuf>,

    /// Directory containing error definition JSON files
    #[arg(short = 'i', long)]
    pub definitions: Option<PathBuf>,

    /// Output path for the generated Rust source file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output directory for per-domain Markdown docs
    #[arg(short = 'd', long)]
    pub docs: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
