use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "credence",
    version,
    about = "README credibility and repository sustainability scoring"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a README against a repository checkout or snapshot
    Docs(DocsCommand),
    /// Evaluate the sustainability gate from activity data
    Gate(GateCommand),
    /// Print the content hash of a configuration file and its overlay
    ConfigHash(ConfigHashCommand),
}

#[derive(Args)]
pub struct DocsCommand {
    pub readme: PathBuf,
    #[arg(long, default_value = "local")]
    pub owner: String,
    #[arg(long, default_value = "local")]
    pub repo: String,
    /// Externally computed documentation quality, 0-100
    #[arg(long, default_value_t = 50.0)]
    pub raw: f64,
    /// Checkout used as the live tree, workflow list and root listing
    #[arg(long, conflicts_with = "snapshot")]
    pub repo_dir: Option<PathBuf>,
    /// JSON file with pre-fetched `tree`, `workflows` and `root`
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
    #[arg(long)]
    pub skip_consilience: bool,
    /// Probe external links (network access)
    #[arg(long)]
    pub check_links: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct GateCommand {
    /// JSON activity aggregate; replaces the git history of `--repo-dir`
    #[arg(long, conflicts_with = "repo_dir")]
    pub activity: Option<PathBuf>,
    /// Git checkout to derive commit activity from
    #[arg(long, default_value = ".")]
    pub repo_dir: PathBuf,
    /// JSON with `archived` and `pushed_at`
    #[arg(long)]
    pub repo_info: Option<PathBuf>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct ConfigHashCommand {
    pub path: PathBuf,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}
