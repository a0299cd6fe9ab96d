//! Rank command

use anyhow::{bail, Context, Result};
use tracing::info;
use warden_stats::{
    fetch, sources, Config, ContestAggregator, ContestInput, ContestProcessor, GitHubReportClient,
    GlobalLeaderboard, RankingEngine,
};

use crate::style::*;
use crate::RankArgs;

pub async fn run(config: &Config, args: RankArgs, verbose: bool) -> Result<()> {
    let contests = load_contests(config, &args).await?;
    if contests.is_empty() {
        bail!("No contests to process");
    }

    let exclude_zero_score = args.exclude_zero_score || config.processing.exclude_zero_score;
    let strict = args.strict || config.processing.strict;
    let engine = RankingEngine::new(
        args.top_percentile.unwrap_or(config.ranking.top_percentile),
        args.ratio_order.unwrap_or(config.ranking.ratio_order),
    )?;

    let processor = ContestProcessor::new(config.replacements.clone());
    let aggregator = ContestAggregator::new(processor, strict).with_verbose(verbose);
    let mut board = GlobalLeaderboard::new(exclude_zero_score);
    let summary = aggregator.run(&contests, &mut board)?;

    for (repo, e) in &summary.failed {
        print_warning(&format!("{}: {}", repo, e));
    }

    let report = engine.rank(&board);
    info!(
        "Selected {} of {} wardens (top_percentile = {})",
        report.selected,
        report.population,
        engine.top_percentile()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_header(&format!(
        "Warden Leaderboard ({} contests, {} wardens)",
        board.contests(),
        board.len()
    ));
    if report.records.is_empty() {
        print_info("No wardens with findings in the selected slice.");
        return Ok(());
    }
    print!("{}", report);
    Ok(())
}

async fn load_contests(config: &Config, args: &RankArgs) -> Result<Vec<ContestInput>> {
    match (&args.contests_csv_file, &args.from_raw_path) {
        (Some(csv), None) => {
            let Some(token) = Config::github_token(args.github_api_key.clone()) else {
                bail!("--github-api-key (or GITHUB_TOKEN) is required with --contests-csv-file");
            };
            let entries = sources::load_contest_list(csv)?;
            let client = GitHubReportClient::new(config.github.clone(), Some(token));
            fetch::load_remote_contests(&client, &entries, args.save_dir.as_ref()).await
        }
        (None, Some(path)) => {
            let files = sources::find_markdown_files(path)?;
            files
                .iter()
                .map(|file| sources::read_local_contest(file))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Failed to load reports from {}", path.display()))
        }
        (Some(_), Some(_)) => bail!("Use either --contests-csv-file or --from-raw-path, not both"),
        (None, None) => bail!("One of --contests-csv-file or --from-raw-path is required"),
    }
}
