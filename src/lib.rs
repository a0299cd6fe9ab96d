//! Warden Stats - Cross-contest leaderboard for Code4rena wardens
//!
//! Reads published contest findings reports (markdown), credits each
//! High/Medium issue to the wardens who submitted it, and aggregates the
//! credits across contests into a leaderboard ranked by findings per issue.
//!
//! # How it works
//!
//! 1. Contest reports are loaded from a CSV of findings repositories or from
//!    local markdown files
//! 2. Each report is split by headers; the Wardens roster seeds a local ledger
//! 3. Every `[H-xx]` / `[M-xx]` issue is credited to its submitters
//! 4. Local ledgers are folded into global per-warden statistics
//! 5. The leaderboard keeps the top slice of wardens by findings/issue ratio
//!
//! # Known data problems
//!
//! - Names misrendered in a specific report are fixed with per-repo typo tables
//! - Bots that are credited but missing from the roster are registered as `bot-<name>`
//! - Malformed reports are skipped unless strict mode is on

pub mod aggregate;
pub mod config;
pub mod contest;
pub mod error;
pub mod fetch;
pub mod issues;
pub mod leaderboard;
pub mod ledger;
pub mod markdown;
pub mod ranking;
pub mod replacements;
pub mod sources;
pub mod submitters;

pub use aggregate::{ContestAggregator, RunSummary};
pub use config::Config;
pub use contest::{ContestInput, ContestProcessor, ContestReport, TopStats};
pub use error::ReportError;
pub use fetch::{load_remote_contests, GitHubReportClient, ReportSource};
pub use issues::{Issue, Severity};
pub use leaderboard::{GlobalLeaderboard, GlobalWardenStats};
pub use ledger::{LocalWardenLedger, Warden};
pub use ranking::{LeaderboardRecord, LeaderboardReport, RankingEngine, RatioOrder};
pub use replacements::KnownReplacements;
