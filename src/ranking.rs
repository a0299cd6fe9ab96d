//! Percentile leaderboard selection
//!
//! Wardens are ordered by findings per issue seen and a slice of the
//! population is reported. The sort direction is explicit; ascending, which
//! reports the lowest-ratio slice, is the default leaderboard rule.

use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ReportError;
use crate::leaderboard::{GlobalLeaderboard, GlobalWardenStats};

pub const MAX_TOP_PERCENTILE: f64 = 0.99;
pub const DEFAULT_TOP_PERCENTILE: f64 = 0.9;

/// Direction in which wardens are sorted by findings per issue before the
/// slice is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RatioOrder {
    #[default]
    Ascending,
    Descending,
}

/// One row of the final leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRecord {
    pub name: String,
    pub total_findings: u32,
    pub total_high: u32,
    pub total_medium: u32,
    pub total_issues: u32,
    pub contest_participations: u32,
    pub avg_findings_per_contest: f64,
    pub avg_findings_per_issue: f64,
}

impl From<&GlobalWardenStats> for LeaderboardRecord {
    fn from(stats: &GlobalWardenStats) -> Self {
        Self {
            name: stats.name.clone(),
            total_findings: stats.total_findings,
            total_high: stats.total_high,
            total_medium: stats.total_medium,
            total_issues: stats.total_issues_seen,
            contest_participations: stats.contest_participations,
            avg_findings_per_contest: stats.avg_findings_per_contest,
            avg_findings_per_issue: stats.avg_findings_per_issue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardReport {
    pub generated_at: DateTime<Utc>,
    pub population: usize,
    /// Size of the selected slice, including wardens without findings.
    pub selected: usize,
    pub top_percentile: f64,
    pub order: RatioOrder,
    pub records: Vec<LeaderboardRecord>,
    /// Mean findings/issues ratio over `records`.
    pub average_ratio: f64,
}

impl LeaderboardReport {
    /// Human readable summary, one line per record plus the average.
    pub fn summary_lines(&self) -> Vec<String> {
        let name_w = self.records.iter().map(|r| r.name.len()).max().unwrap_or(0);
        let width = |f: fn(&LeaderboardRecord) -> u32| {
            self.records
                .iter()
                .map(|r| f(r).to_string().len())
                .max()
                .unwrap_or(0)
        };
        let findings_w = width(|r| r.total_findings);
        let issues_w = width(|r| r.total_issues);
        let contests_w = width(|r| r.contest_participations);

        let mut lines: Vec<String> = self
            .records
            .iter()
            .map(|r| {
                format!(
                    "- {:<name_w$} findings: {:>findings_w$}, issues: {:>issues_w$}, contests: {:>contests_w$}, avg_findings_per_issues: {:.2}",
                    r.name,
                    r.total_findings,
                    r.total_issues,
                    r.contest_participations,
                    r.avg_findings_per_issue,
                )
            })
            .collect();
        lines.push(format!(
            "Average ratio of findings/total_reports: {:.2}",
            self.average_ratio
        ));
        lines
    }
}

impl fmt::Display for LeaderboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.summary_lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingEngine {
    top_percentile: f64,
    order: RatioOrder,
}

impl RankingEngine {
    pub fn new(top_percentile: f64, order: RatioOrder) -> Result<Self, ReportError> {
        if !(0.0..=MAX_TOP_PERCENTILE).contains(&top_percentile) {
            return Err(ReportError::InvalidPercentile {
                value: top_percentile,
            });
        }
        Ok(Self {
            top_percentile,
            order,
        })
    }

    pub fn top_percentile(&self) -> f64 {
        self.top_percentile
    }

    pub fn order(&self) -> RatioOrder {
        self.order
    }

    /// `max(1, floor(population * (1 - top_percentile)))`
    pub fn slice_size(&self, population: usize) -> usize {
        let share = 1.0 - self.top_percentile;
        ((population as f64 * share).floor() as usize).max(1)
    }

    pub fn rank(&self, board: &GlobalLeaderboard) -> LeaderboardReport {
        let population = board.len();
        info!("Total number of wardens on all contests: {}", population);

        let mut sorted: Vec<&GlobalWardenStats> = board.wardens().iter().collect();
        sorted.sort_by(|a, b| {
            let ord = a.avg_findings_per_issue.total_cmp(&b.avg_findings_per_issue);
            match self.order {
                RatioOrder::Ascending => ord,
                RatioOrder::Descending => ord.reverse(),
            }
        });

        let selected = if population == 0 {
            0
        } else {
            self.slice_size(population)
        };
        info!(
            "Number of wardens in the top {:.1}%: {}",
            (1.0 - self.top_percentile) * 100.0,
            selected
        );

        let mut slice: Vec<&GlobalWardenStats> = sorted
            .into_iter()
            .take(selected)
            .filter(|s| s.total_findings > 0)
            .collect();
        slice.sort_by(|a, b| b.total_findings.cmp(&a.total_findings));

        let average_ratio = if slice.is_empty() {
            0.0
        } else {
            let total: f64 = slice
                .iter()
                .filter(|s| s.total_issues_seen > 0)
                .map(|s| s.total_findings as f64 / s.total_issues_seen as f64)
                .sum();
            total / slice.len() as f64
        };

        LeaderboardReport {
            generated_at: Utc::now(),
            population,
            selected,
            top_percentile: self.top_percentile,
            order: self.order,
            records: slice.into_iter().map(LeaderboardRecord::from).collect(),
            average_ratio,
        }
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self {
            top_percentile: DEFAULT_TOP_PERCENTILE,
            order: RatioOrder::Ascending,
        }
    }
}
