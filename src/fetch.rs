//! Report retrieval from GitHub findings repositories
//!
//! Reports are read as raw `report.md` files. Authentication uses a personal
//! access token passed on the command line or via GITHUB_TOKEN.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::GitHubConfig;
use crate::contest::ContestInput;
use crate::sources::{self, ContestEntry};

const USER_AGENT: &str = concat!("warden-stats/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand back the raw report text for a findings repo URL.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_report(&self, repo_url: &str) -> Result<String>;
}

pub struct GitHubReportClient {
    client: reqwest::Client,
    config: GitHubConfig,
    token: Option<String>,
}

impl GitHubReportClient {
    pub fn new(config: GitHubConfig, token: Option<String>) -> Self {
        if token.is_some() {
            info!("Report client initialized with authentication token");
        } else {
            warn!("Report client initialized WITHOUT token - rate limits will be very low");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config,
            token,
        }
    }

    /// Check if authenticated
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Raw content URL of the report file in a findings repo.
    pub fn raw_url(&self, repo_url: &str) -> String {
        let base = repo_url
            .trim_end_matches('/')
            .replacen("github.com", &self.config.raw_host, 1);
        format!(
            "{}/refs/heads/{}/{}",
            base, self.config.branch, self.config.report_file
        )
    }

    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.raw+json");

        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("token {}", token));
        }

        req
    }
}

#[async_trait]
impl ReportSource for GitHubReportClient {
    async fn fetch_report(&self, repo_url: &str) -> Result<String> {
        let url = self.raw_url(repo_url);
        debug!("Downloading {}", url);

        let response = self
            .build_request(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?;

        if !response.status().is_success() {
            bail!("Failed to download report from {}: {}", url, response.status());
        }

        Ok(response.text().await?)
    }
}

/// Retrieve every listed report, one at a time in list order.
///
/// Reports are written to `save_dir` when one is given. Any transport
/// failure aborts the load.
pub async fn load_remote_contests(
    source: &dyn ReportSource,
    entries: &[ContestEntry],
    save_dir: Option<&PathBuf>,
) -> Result<Vec<ContestInput>> {
    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut contests = Vec::with_capacity(entries.len());
    for entry in entries {
        let repo_name = sources::repo_name_from(&entry.findings_repo);
        progress.set_message(format!("Loading {}", repo_name));

        let raw_report = source
            .fetch_report(&entry.findings_repo)
            .await
            .with_context(|| format!("Failed to load {}", entry.findings_repo))?;

        if let Some(dir) = save_dir {
            sources::save_report(dir, &repo_name, &raw_report)?;
        }

        contests.push(ContestInput {
            repo_name,
            url: entry.findings_repo.clone(),
            raw_report,
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!("Loaded {} reports", contests.len());
    Ok(contests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeSource {
        reports: HashMap<String, String>,
    }

    #[async_trait]
    impl ReportSource for FakeSource {
        async fn fetch_report(&self, repo_url: &str) -> Result<String> {
            match self.reports.get(repo_url) {
                Some(text) => Ok(text.clone()),
                None => bail!("404 for {}", repo_url),
            }
        }
    }

    fn entry(url: &str) -> ContestEntry {
        ContestEntry {
            findings_repo: url.to_string(),
        }
    }

    #[test]
    fn test_raw_url() {
        let client = GitHubReportClient::new(GitHubConfig::default(), None);
        assert_eq!(
            client.raw_url("https://github.com/code-423n4/2023-10-wildcat-findings"),
            "https://raw.githubusercontent.com/code-423n4/2023-10-wildcat-findings/refs/heads/main/report.md"
        );
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_load_remote_contests_saves_reports() -> Result<()> {
        let url = "https://github.com/code-423n4/2023-01-x-findings";
        let source = FakeSource {
            reports: HashMap::from([(url.to_string(), "# Overview\n".to_string())]),
        };
        let dir = tempfile::tempdir()?;
        let save_dir = dir.path().to_path_buf();

        let contests = tokio_test::block_on(load_remote_contests(
            &source,
            &[entry(url)],
            Some(&save_dir),
        ))?;

        assert_eq!(contests.len(), 1);
        assert_eq!(contests[0].repo_name, "2023-01-x");
        assert_eq!(contests[0].url, url);
        assert!(save_dir.join("2023-01-x.md").exists());
        Ok(())
    }

    #[test]
    fn test_load_remote_contests_fails_on_transport_error() {
        let source = FakeSource {
            reports: HashMap::new(),
        };
        let result = tokio_test::block_on(load_remote_contests(
            &source,
            &[entry("https://github.com/code-423n4/missing-findings")],
            None,
        ));
        assert!(result.is_err());
    }
}
