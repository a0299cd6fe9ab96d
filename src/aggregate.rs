//! Sequential run over many contests
//!
//! Each contest is parsed and folded into a caller-owned leaderboard in input
//! order. Strict mode stops at the first fatal parse error; otherwise the
//! failing contest is skipped and the run continues.

use tracing::{debug, error, info, info_span, warn};

use crate::contest::{ContestInput, ContestProcessor};
use crate::error::ReportError;
use crate::leaderboard::GlobalLeaderboard;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub processed: usize,
    /// Contests skipped for recoverable reasons (no issues, no roster).
    pub skipped: usize,
    /// Contests skipped after a fatal error in lenient mode.
    pub failed: Vec<(String, ReportError)>,
}

#[derive(Debug, Clone, Default)]
pub struct ContestAggregator {
    processor: ContestProcessor,
    strict: bool,
    verbose: bool,
}

impl ContestAggregator {
    pub fn new(processor: ContestProcessor, strict: bool) -> Self {
        Self {
            processor,
            strict,
            verbose: false,
        }
    }

    /// Log per-contest top performers while running.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn run<'a, I>(
        &self,
        contests: I,
        board: &mut GlobalLeaderboard,
    ) -> Result<RunSummary, ReportError>
    where
        I: IntoIterator<Item = &'a ContestInput>,
    {
        let mut summary = RunSummary::default();

        for contest in contests {
            let span = info_span!("contest", repo = %contest.repo_name);
            let _enter = span.enter();

            match self.processor.process(contest) {
                Ok(report) => {
                    if self.verbose {
                        report.log_top_stats(board.exclude_zero_score());
                    }
                    report.log_details();
                    board.fold(&report);
                    summary.processed += 1;
                }
                Err(e) if e.is_fatal() && self.strict => {
                    error!("{}", e);
                    return Err(e);
                }
                Err(e) if e.is_fatal() => {
                    error!("Skipping contest after parse failure: {}", e);
                    summary.failed.push((contest.repo_name.clone(), e));
                }
                Err(e) => {
                    warn!("{}, skipping", e);
                    summary.skipped += 1;
                }
            }
        }

        debug!("Global leaderboard:\n{}", board);
        info!(
            "Processed {} contests ({} skipped, {} failed)",
            summary.processed,
            summary.skipped,
            summary.failed.len()
        );
        Ok(summary)
    }
}
