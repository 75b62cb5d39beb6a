use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "inspection-import",
    version,
    about = "Convert the coach inspection checklist transcript into idempotent SQL"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(default_value = "Untitled spreadsheet - Sheet1.pdf")]
    pub pdf_path: PathBuf,

    /// Read pre-extracted text (pages separated by form feeds) instead of running pdftotext.
    #[arg(long)]
    pub text_input: Option<PathBuf>,

    #[arg(long)]
    pub max_pages: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value = "complete_inspection_data.sql")]
    pub sql_path: PathBuf,

    #[arg(long, default_value = "inspection_data.json")]
    pub json_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub no_json: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub show_skipped: bool,
}
