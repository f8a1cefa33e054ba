use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use normate_core::Perspective;

#[derive(Debug, Parser)]
#[command(
    name = "normate",
    version,
    about = "Submit product analyses and explore their results from the terminal"
)]
pub struct Cli {
    /// Configuration file (defaults to ./normate.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log destination: terminal, file, both or off
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload data files and start an analysis
    Submit(SubmitArgs),

    /// Wait for a job's results and render the report
    Report(ReportArgs),

    /// Wait for a job's results and export them as a PDF
    Export(ExportArgs),

    /// Ask follow-up questions about a completed report
    Chat(ChatArgs),

    /// Inspect or prune past analyses
    #[command(subcommand)]
    History(HistoryCommand),

    /// Check that the backend is reachable
    Health,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Quantitative data file (.csv, .xlsx, .xls); repeatable
    #[arg(long = "quant", required = true)]
    pub quant_files: Vec<PathBuf>,

    /// Qualitative feedback file (.txt, .docx, .doc); repeatable
    #[arg(long = "qual", required = true)]
    pub qual_files: Vec<PathBuf>,

    /// Research question (more than 10 characters)
    #[arg(long)]
    pub question: String,

    /// Product description (more than 5 characters)
    #[arg(long)]
    pub product: String,

    /// Time period the data covers
    #[arg(long)]
    pub period: Option<String>,

    /// Average revenue per user, used for the financial estimate
    #[arg(long)]
    pub arpu: Option<f64>,

    /// Keep running and render the report once it is ready
    #[arg(long)]
    pub watch: bool,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ViewArgs {
    /// Perspective to render: pm, cfo or designer
    #[arg(long, short)]
    pub perspective: Option<Perspective>,

    /// Rendered report bitmap(s) used for PDF export, top to bottom; repeatable
    #[arg(long = "snapshot")]
    pub snapshots: Vec<PathBuf>,

    /// Directory for exported documents, overriding the configuration file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the report open and read commands from stdin
    #[arg(long, short)]
    pub interactive: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    pub job_id: String,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    pub job_id: String,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    pub job_id: String,

    /// Question to ask; repeatable. Without any, questions are read from stdin.
    #[arg(long = "ask")]
    pub questions: Vec<String>,

    /// Ask the report's n-th suggested question (1-based) first
    #[arg(long)]
    pub suggested: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List past analyses
    List,

    /// Delete one analysis
    Delete { job_id: String },

    /// Delete every analysis
    Wipe {
        /// Confirm deleting the whole history
        #[arg(long)]
        yes: bool,
    },
}
