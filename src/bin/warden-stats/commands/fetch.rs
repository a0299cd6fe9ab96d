//! Fetch command

use std::path::Path;

use anyhow::Result;
use warden_stats::{fetch, sources, Config, GitHubReportClient};

use crate::style::*;

pub async fn run(
    config: &Config,
    contests_csv_file: &Path,
    output: &Path,
    github_api_key: Option<String>,
) -> Result<()> {
    let entries = sources::load_contest_list(contests_csv_file)?;
    if entries.is_empty() {
        print_info("No contests with a findings repository.");
        return Ok(());
    }

    let token = Config::github_token(github_api_key);
    if token.is_none() {
        print_warning("No GitHub token given; downloads may be rate limited.");
    }

    let client = GitHubReportClient::new(config.github.clone(), token);
    let output = output.to_path_buf();
    let contests = fetch::load_remote_contests(&client, &entries, Some(&output)).await?;

    print_success(&format!(
        "Saved {} reports to {}",
        contests.len(),
        output.display()
    ));
    Ok(())
}
