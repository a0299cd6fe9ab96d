//! Single contest processing
//!
//! Turns one report into a ledger of wardens and the High/Medium issues they
//! are credited with.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::ReportError;
use crate::issues::{self, Issue};
use crate::ledger::{self, LocalWardenLedger};
use crate::markdown;
use crate::replacements::KnownReplacements;
use crate::submitters;

/// Raw report text for one contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestInput {
    pub repo_name: String,
    pub url: String,
    pub raw_report: String,
}

#[derive(Debug, Clone)]
pub struct ContestReport {
    pub repo_name: String,
    pub url: String,
    pub ledger: LocalWardenLedger,
    pub issues: Vec<Issue>,
}

/// Per-contest cutoffs for the top 10% and top 50% of wardens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopStats {
    pub top_10_cutoff: usize,
    pub top_10_min: u32,
    pub top_50_cutoff: usize,
    pub top_50_min: u32,
    /// Finding totals of every ranked warden, most first.
    pub findings: Vec<u32>,
}

impl ContestReport {
    pub fn total_findings(&self) -> u32 {
        self.ledger.total_findings()
    }

    /// Top 10% / 50% cutoffs. In exclusive mode wardens without findings
    /// are left out first.
    pub fn top_stats(&self, exclusive: bool) -> Option<TopStats> {
        let pruned;
        let ledger = if exclusive {
            pruned = self.ledger.pruned();
            &pruned
        } else {
            &self.ledger
        };

        let sorted = ledger.sorted_by_findings();
        if sorted.is_empty() {
            return None;
        }

        let cutoff = |share: f64| ((sorted.len() as f64 * share).round_ties_even() as usize).max(1);
        let top_10_cutoff = cutoff(0.1);
        let top_50_cutoff = cutoff(0.5);

        Some(TopStats {
            top_10_cutoff,
            top_10_min: sorted[top_10_cutoff - 1].total_findings(),
            top_50_cutoff,
            top_50_min: sorted[top_50_cutoff - 1].total_findings(),
            findings: sorted.iter().map(|w| w.total_findings()).collect(),
        })
    }

    /// Log the top performers at info level.
    pub fn log_top_stats(&self, exclusive: bool) {
        let Some(stats) = self.top_stats(exclusive) else {
            return;
        };
        let ledger = if exclusive {
            self.ledger.pruned()
        } else {
            self.ledger.clone()
        };
        let sorted = ledger.sorted_by_findings();

        for (label, cutoff, min) in [
            ("10%", stats.top_10_cutoff, stats.top_10_min),
            ("50%", stats.top_50_cutoff, stats.top_50_min),
        ] {
            info!(
                "Top {} performers ({} wardens) [{} total]",
                label, cutoff, min
            );
            for warden in &sorted[..cutoff] {
                info!(
                    "  - {}: {} high, {} medium",
                    warden.name,
                    warden.findings_high(),
                    warden.findings_medium()
                );
            }
        }
    }

    /// Dump wardens and issues at debug level.
    pub fn log_details(&self) {
        let (scoring, idle): (Vec<_>, Vec<_>) =
            self.ledger.iter().partition(|w| w.total_findings() > 0);

        debug!("Wardens that found High or Medium severity issues ({})", scoring.len());
        for warden in &scoring {
            debug!("{}", warden.name);
            for uid in warden.findings() {
                if let Some(issue) = self.issues.iter().find(|i| i.uid == *uid) {
                    debug!(" - {}: {}", issue.label(), issue.title);
                }
            }
        }

        debug!("Wardens that did not find High or Medium severity issues ({})", idle.len());
        for warden in &idle {
            debug!("{}", warden.name);
        }

        debug!("Issues found ({}) per warden", self.issues.len());
        for issue in &self.issues {
            debug!("Issue {}: {}", issue.label(), issue.title);
            for name in &issue.attributions {
                debug!("  - {}", name);
            }
        }
    }
}

/// Parses one contest at a time using the repo's exception tables.
#[derive(Debug, Clone, Default)]
pub struct ContestProcessor {
    replacements: KnownReplacements,
}

impl ContestProcessor {
    pub fn new(replacements: KnownReplacements) -> Self {
        Self { replacements }
    }

    pub fn process(&self, contest: &ContestInput) -> Result<ContestReport, ReportError> {
        let repo = contest.repo_name.as_str();
        debug!("Processing contest: {}", repo);

        let bots = self.replacements.bots_for(repo);
        let typos = self.replacements.typos_for(repo);

        let segments = markdown::split(&contest.raw_report, &markdown::report_rules(), false);

        let roster = ledger::find_roster(&segments).ok_or_else(|| {
            ReportError::MissingWardenRoster {
                repo: repo.to_string(),
            }
        })?;
        let mut ledger = LocalWardenLedger::from_roster(&roster.content, &bots);

        let mut found = Vec::new();
        let mut uid = 1;
        for section in issues::extract_sections(&segments) {
            let header = match issues::parse_issue_header(&section.description) {
                Ok(header) => header,
                Err(e) => {
                    warn!("Failed to extract issue info, skipping: {}", e);
                    continue;
                }
            };
            let submitters = submitters::extract_submitters(&section.description, &typos)?;

            let mut issue = Issue::new(header, uid, repo);
            issue.impact = section.impact;
            issue.proof_of_concept = section.proof_of_concept;
            debug!(
                "Issue {} ({} submitters): {}",
                issue.label(),
                submitters.len(),
                issue.title
            );

            for submitter in &submitters {
                if let Err(e) = ledger.credit(&mut issue, submitter) {
                    trace!("Dropping attribution: {}", e);
                }
            }

            found.push(issue);
            uid += 1;
        }

        if found.is_empty() {
            return Err(ReportError::EmptyContestReport {
                repo: repo.to_string(),
            });
        }

        Ok(ContestReport {
            repo_name: contest.repo_name.clone(),
            url: contest.url.clone(),
            ledger,
            issues: found,
        })
    }
}
