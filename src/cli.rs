use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repo-report")]
#[command(about = "Markdown report of how a repository evolved between two points in its history")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log resolution and external commands to stderr")]
    pub verbose: bool,
}

#[derive(Args, Clone)]
pub struct StatsArgs {
    #[arg(
        long,
        default_value = "latest",
        help = "Baseline: tag, YYYY-MM-DD, latest, latest-of-major[-N]"
    )]
    pub from: String,

    #[arg(
        long,
        default_value = "HEAD",
        help = "Report point: tag, YYYY-MM-DD, latest, latest-of-major[-N] or HEAD"
    )]
    pub till: String,

    #[arg(long, default_value = "Report", help = "Title for the report")]
    pub title: String,

    #[arg(long, help = "Skip changelog report")]
    pub no_changelog: bool,

    #[arg(long, help = "Skip codebase change report")]
    pub no_codebase: bool,

    #[arg(long, help = "Skip contributor report")]
    pub no_contributors: bool,

    #[arg(long, help = "Skip codebase indicators that have a delta of 0")]
    pub only_deltas: bool,

    #[arg(
        long,
        default_value = crate::changelog::DEFAULT_FILE,
        help = "Changelog file, relative to the repository"
    )]
    pub changelog: PathBuf,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a codebase diff report
    Stats(StatsArgs),
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::logging::init(self.common.verbose);
        match self.command {
            Commands::Stats(args) => crate::report::exec(self.common, args),
        }
    }
}
