//! Cross-contest warden statistics
//!
//! The leaderboard is owned by the caller and folded once per contest, in
//! input order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::contest::ContestReport;
use crate::ledger::{LocalWardenLedger, Warden};

/// Lifetime statistics for one warden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalWardenStats {
    pub name: String,
    pub total_findings: u32,
    pub total_high: u32,
    pub total_medium: u32,
    pub total_issues_seen: u32,
    pub contest_participations: u32,
    pub avg_findings_per_contest: f64,
    pub avg_findings_per_issue: f64,
}

impl GlobalWardenStats {
    pub fn new(warden: &Warden, report_issues: u32) -> Self {
        let mut stats = Self {
            name: warden.name.clone(),
            total_findings: warden.total_findings(),
            total_high: warden.findings_high(),
            total_medium: warden.findings_medium(),
            total_issues_seen: report_issues,
            contest_participations: 1,
            avg_findings_per_contest: 0.0,
            avg_findings_per_issue: 0.0,
        };
        stats.recompute();
        stats
    }

    /// Add one more contest's results.
    ///
    /// With `exclude_zero_score`, a contest in which the warden scored
    /// nothing leaves the stats untouched.
    pub fn update(&mut self, warden: &Warden, exclude_zero_score: bool, report_issues: u32) {
        if exclude_zero_score && warden.total_findings() == 0 {
            trace!("Skipping zero-score contest for {}", self.name);
            return;
        }
        self.total_findings += warden.total_findings();
        self.total_high += warden.findings_high();
        self.total_medium += warden.findings_medium();
        self.total_issues_seen += report_issues;
        self.contest_participations += 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.avg_findings_per_contest = ratio(self.total_findings, self.contest_participations);
        self.avg_findings_per_issue = ratio(self.total_findings, self.total_issues_seen);
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for GlobalWardenStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "findings={} (high={}, medium={}), issues={}, contests={}, per_contest={:.2}, per_issue={:.2}",
            self.total_findings,
            self.total_high,
            self.total_medium,
            self.total_issues_seen,
            self.contest_participations,
            self.avg_findings_per_contest,
            self.avg_findings_per_issue
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalLeaderboard {
    stats: Vec<GlobalWardenStats>,
    index: HashMap<String, usize>,
    exclude_zero_score: bool,
    contests: u32,
}

impl GlobalLeaderboard {
    pub fn new(exclude_zero_score: bool) -> Self {
        Self {
            exclude_zero_score,
            ..Self::default()
        }
    }

    pub fn exclude_zero_score(&self) -> bool {
        self.exclude_zero_score
    }

    /// Fold a processed contest into the lifetime stats.
    pub fn fold(&mut self, report: &ContestReport) {
        self.fold_ledger(&report.ledger, report.issues.len() as u32);
    }

    pub fn fold_ledger(&mut self, ledger: &LocalWardenLedger, report_issues: u32) {
        for warden in ledger.iter() {
            match self.index.get(&warden.name) {
                Some(&i) => self.stats[i].update(warden, self.exclude_zero_score, report_issues),
                None => {
                    self.index.insert(warden.name.clone(), self.stats.len());
                    self.stats.push(GlobalWardenStats::new(warden, report_issues));
                }
            }
        }
        self.contests += 1;
    }

    pub fn get(&self, name: &str) -> Option<&GlobalWardenStats> {
        self.index.get(name).map(|&i| &self.stats[i])
    }

    /// All wardens, in first-seen order.
    pub fn wardens(&self) -> &[GlobalWardenStats] {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Number of contests folded so far.
    pub fn contests(&self) -> u32 {
        self.contests
    }
}

impl fmt::Display for GlobalLeaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by_contest_avg = |a: &&GlobalWardenStats, b: &&GlobalWardenStats| {
            b.avg_findings_per_contest
                .total_cmp(&a.avg_findings_per_contest)
        };

        let mut scoring: Vec<_> = self.stats.iter().filter(|s| s.total_findings > 0).collect();
        scoring.sort_by(by_contest_avg);
        writeln!(f, "Total H/M wardens: {}", scoring.len())?;
        for stats in scoring {
            writeln!(f, "  - {}: {}", stats.name, stats)?;
        }

        if self.exclude_zero_score {
            let mut idle: Vec<_> = self.stats.iter().filter(|s| s.total_findings == 0).collect();
            idle.sort_by(by_contest_avg);
            writeln!(f, "Total wardens with no findings: {}", idle.len())?;
            for stats in idle {
                writeln!(f, "  - {}: {}", stats.name, stats)?;
            }
        }
        Ok(())
    }
}
