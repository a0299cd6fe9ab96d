//! Inspect command

use std::path::Path;

use anyhow::Result;
use warden_stats::{sources, Config, ContestProcessor};

use crate::style::*;

pub fn run(config: &Config, file: &Path) -> Result<()> {
    let contest = sources::read_local_contest(file)?;
    let report = ContestProcessor::new(config.replacements.clone()).process(&contest)?;

    print_header(&format!("Contest {}", report.repo_name));
    println!(
        "{} wardens, {} issues, {} findings",
        report.ledger.len(),
        report.issues.len(),
        report.total_findings()
    );

    let exclusive = config.processing.exclude_zero_score;
    if let Some(stats) = report.top_stats(exclusive) {
        let ledger = if exclusive {
            report.ledger.pruned()
        } else {
            report.ledger.clone()
        };
        let sorted = ledger.sorted_by_findings();

        for (label, cutoff, min) in [
            ("10%", stats.top_10_cutoff, stats.top_10_min),
            ("50%", stats.top_50_cutoff, stats.top_50_min),
        ] {
            print_header(&format!(
                "Top {} performers ({} wardens, at least {} findings)",
                label, cutoff, min
            ));
            for warden in &sorted[..cutoff] {
                println!(
                    "  {:<24} {}",
                    warden.name,
                    severity_counts(warden.findings_high(), warden.findings_medium())
                );
            }
        }
    }

    print_header("Issues");
    for issue in &report.issues {
        println!("{} {}", style_cyan(&issue.label()), issue.title);
        println!("    {}", style_dim(&issue.attributions.join(", ")));
    }

    Ok(())
}
