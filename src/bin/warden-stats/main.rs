//! Warden Stats CLI
//!
//! Command-line interface for building the cross-contest warden leaderboard.

mod commands;
mod style;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use style::*;
use tracing_subscriber::EnvFilter;
use warden_stats::RatioOrder;

#[derive(Parser)]
#[command(name = "warden-stats")]
#[command(author = "CortexLM")]
#[command(version)]
#[command(about = "Warden Stats - Rank Code4rena wardens by findings per issue", long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "WARDEN_STATS_CONFIG", default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output (per-contest dumps)
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    rank: RankArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RankArgs {
    /// CSV file listing contests (findingsRepo column)
    #[arg(short = 'c', long, conflicts_with = "from_raw_path")]
    pub contests_csv_file: Option<PathBuf>,

    /// Markdown report file or directory of reports
    #[arg(short = 'r', long)]
    pub from_raw_path: Option<PathBuf>,

    /// GitHub token used to download reports
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_api_key: Option<String>,

    /// Leave wardens without findings out of the statistics
    #[arg(short = 'e', long)]
    pub exclude_zero_score: bool,

    /// Fraction of wardens left out of the leaderboard (0.0 - 0.99)
    #[arg(long)]
    pub top_percentile: Option<f64>,

    /// Sort direction of the findings/issue ratio
    #[arg(long, value_enum)]
    pub ratio_order: Option<RatioOrder>,

    /// Abort on the first malformed report
    #[arg(long)]
    pub strict: bool,

    /// Save downloaded reports to this directory
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Print the leaderboard as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the leaderboard (default)
    #[command(visible_alias = "r")]
    Rank(RankArgs),

    /// Parse a single report and show its top performers
    #[command(visible_alias = "i")]
    Inspect {
        /// Markdown report file
        file: PathBuf,
    },

    /// Download every listed report to a directory
    #[command(visible_alias = "f")]
    Fetch {
        /// CSV file listing contests (findingsRepo column)
        #[arg(short = 'c', long)]
        contests_csv_file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// GitHub token used to download reports
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match warden_stats::Config::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Rank(args)) => commands::rank::run(&config, args, cli.verbose).await,
        Some(Commands::Inspect { file }) => commands::inspect::run(&config, &file),
        Some(Commands::Fetch {
            contests_csv_file,
            output,
            github_api_key,
        }) => commands::fetch::run(&config, &contests_csv_file, &output, github_api_key).await,
        None => commands::rank::run(&config, cli.rank, cli.verbose).await,
    };

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
