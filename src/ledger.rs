//! Per-contest warden roster and finding attribution

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::ReportError;
use crate::issues::{Issue, Severity};
use crate::markdown::{Segment, ITEM, TOPIC};
use crate::replacements::bot_name;
use crate::submitters::unescape_underscores;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warden {
    pub name: String,
    findings: Vec<u32>,
    findings_high: u32,
    findings_medium: u32,
}

impl Warden {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            findings: Vec::new(),
            findings_high: 0,
            findings_medium: 0,
        }
    }

    /// Issue uids credited to this warden, in attribution order.
    pub fn findings(&self) -> &[u32] {
        &self.findings
    }

    pub fn findings_high(&self) -> u32 {
        self.findings_high
    }

    pub fn findings_medium(&self) -> u32 {
        self.findings_medium
    }

    pub fn total_findings(&self) -> u32 {
        let total = self.findings.len() as u32;
        debug_assert_eq!(total, self.findings_high + self.findings_medium);
        total
    }

    fn record(&mut self, issue: &Issue) {
        self.findings.push(issue.uid);
        match issue.severity {
            Severity::High => self.findings_high += 1,
            Severity::Medium => self.findings_medium += 1,
        }
    }
}

impl fmt::Display for Warden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} findings ({} high, {} medium)",
            self.name,
            self.total_findings(),
            self.findings_high,
            self.findings_medium
        )
    }
}

/// Wardens of one contest, in roster order.
#[derive(Debug, Clone, Default)]
pub struct LocalWardenLedger {
    wardens: Vec<Warden>,
    index: HashMap<String, usize>,
    bots: Vec<String>,
}

impl LocalWardenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the ledger from a roster listing plus the repo's known bots.
    pub fn from_roster(roster: &str, bots: &[String]) -> Self {
        let mut ledger = Self::new();
        for name in parse_roster(roster) {
            ledger.insert(name);
        }
        for bot in bots {
            ledger.insert(bot_name(bot));
        }
        ledger.bots = bots.to_vec();
        debug!("Ledger has {} wardens", ledger.len());
        ledger
    }

    /// Add a warden; returns false if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.index.contains_key(&name) {
            debug!("Duplicate roster entry: {}", name);
            return false;
        }
        self.index.insert(name.clone(), self.wardens.len());
        self.wardens.push(Warden::new(name));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Warden> {
        self.index.get(name).map(|&i| &self.wardens[i])
    }

    pub fn len(&self) -> usize {
        self.wardens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wardens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warden> {
        self.wardens.iter()
    }

    /// Sum of all findings credited in this contest.
    pub fn total_findings(&self) -> u32 {
        self.wardens.iter().map(Warden::total_findings).sum()
    }

    /// Credit `submitter` with `issue`, linking both sides.
    pub fn credit(&mut self, issue: &mut Issue, submitter: &str) -> Result<(), ReportError> {
        let name = if self.bots.iter().any(|b| b == submitter) {
            bot_name(submitter)
        } else {
            submitter.to_string()
        };

        let Some(&i) = self.index.get(&name) else {
            return Err(ReportError::UnresolvedSubmitterName { name });
        };

        let warden = &mut self.wardens[i];
        warden.record(issue);
        if !issue.attributions.contains(&warden.name) {
            issue.attributions.push(warden.name.clone());
        }
        Ok(())
    }

    /// Remove wardens with no findings.
    pub fn prune(&mut self) {
        self.wardens.retain(|w| w.total_findings() > 0);
        self.index = self
            .wardens
            .iter()
            .enumerate()
            .map(|(i, w)| (w.name.clone(), i))
            .collect();
    }

    pub fn pruned(&self) -> Self {
        let mut ledger = self.clone();
        ledger.prune();
        ledger
    }

    /// Wardens by total findings, most first. Ties keep roster order.
    pub fn sorted_by_findings(&self) -> Vec<&Warden> {
        let mut sorted: Vec<&Warden> = self.wardens.iter().collect();
        sorted.sort_by(|a, b| b.total_findings().cmp(&a.total_findings()));
        sorted
    }
}

/// The "Overview / Wardens" segment of a report.
pub fn find_roster(segments: &[Segment]) -> Option<&Segment> {
    segments
        .iter()
        .find(|s| s.header(TOPIC) == Some("Overview") && s.header(ITEM) == Some("Wardens"))
}

/// Names from a numbered roster list.
///
/// Entries may be `[name](url)` links and may carry a trailing parenthetical
/// such as team members; both are stripped. Lists either number every entry
/// `1.` or count upwards.
pub fn parse_roster(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut counter = 1;

    for line in text.lines().map(str::trim) {
        let numbered = format!("{}. ", counter);
        let Some(entry) = line
            .strip_prefix("1. ")
            .or_else(|| line.strip_prefix(numbered.as_str()))
        else {
            continue;
        };

        let mut name = match entry.strip_prefix('[') {
            Some(rest) => rest.split(']').next().unwrap_or_default(),
            None => entry,
        };
        if let Some((head, _)) = name.split_once('(') {
            name = head;
        }
        let name = unescape_underscores(name.trim());
        if !name.is_empty() {
            names.push(name);
        }
        counter += 1;
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::IssueHeader;

    const ROSTER: &str = "\
The following wardens participated:

1. [alice](https://code4rena.com/@alice)
2. bob (team lead)
3. [The&#95;Team](https://code4rena.com/@team) ([m1](https://x.io), m2)
4. carol\\_c

This audit was judged by someone.";

    fn issue(uid: u32, severity: Severity) -> Issue {
        Issue::new(
            IssueHeader {
                severity,
                sequence_id: uid,
                title: format!("issue {}", uid),
            },
            uid,
            "2023-01-test",
        )
    }

    #[test]
    fn test_parse_roster() {
        assert_eq!(
            parse_roster(ROSTER),
            vec!["alice", "bob", "The_Team", "carol_c"]
        );
    }

    #[test]
    fn test_parse_roster_repeated_one() {
        assert_eq!(parse_roster("1. a\n1. b\n1. c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_bots_are_injected() {
        let ledger = LocalWardenLedger::from_roster(ROSTER, &["henry".to_string()]);
        assert_eq!(ledger.len(), 5);
        assert!(ledger.get("bot-henry").is_some());
        assert!(ledger.get("henry").is_none());
    }

    #[test]
    fn test_credit_links_both_sides() {
        let mut ledger = LocalWardenLedger::from_roster(ROSTER, &[]);
        let mut high = issue(1, Severity::High);
        let mut medium = issue(2, Severity::Medium);

        ledger.credit(&mut high, "alice").expect("alice is listed");
        ledger.credit(&mut medium, "alice").expect("alice is listed");
        ledger.credit(&mut medium, "bob").expect("bob is listed");

        let alice = ledger.get("alice").expect("alice");
        assert_eq!(alice.findings(), &[1, 2]);
        assert_eq!(alice.findings_high(), 1);
        assert_eq!(alice.findings_medium(), 1);
        assert_eq!(alice.total_findings(), 2);
        assert_eq!(medium.attributions, vec!["alice", "bob"]);
        assert_eq!(ledger.total_findings(), 3);
    }

    #[test]
    fn test_bot_submitter_is_relabelled() {
        let mut ledger = LocalWardenLedger::from_roster(ROSTER, &["henry".to_string()]);
        let mut high = issue(1, Severity::High);
        ledger.credit(&mut high, "henry").expect("bot resolves");
        assert_eq!(high.attributions, vec!["bot-henry"]);
        assert_eq!(ledger.get("bot-henry").map(Warden::total_findings), Some(1));
    }

    #[test]
    fn test_unresolved_submitter() {
        let mut ledger = LocalWardenLedger::from_roster(ROSTER, &[]);
        let mut high = issue(1, Severity::High);
        let err = ledger.credit(&mut high, "ghost").expect_err("ghost is unlisted");
        assert_eq!(
            err,
            ReportError::UnresolvedSubmitterName {
                name: "ghost".to_string()
            }
        );
        assert!(high.attributions.is_empty());
        assert_eq!(ledger.total_findings(), 0);
    }

    #[test]
    fn test_double_credit_counts_twice() {
        let mut ledger = LocalWardenLedger::from_roster(ROSTER, &[]);
        let mut high = issue(1, Severity::High);
        ledger.credit(&mut high, "bob").expect("bob");
        ledger.credit(&mut high, "bob").expect("bob");
        assert_eq!(ledger.get("bob").map(Warden::total_findings), Some(2));
        assert_eq!(high.attributions, vec!["bob"]);
    }

    #[test]
    fn test_prune_and_sort() {
        let mut ledger = LocalWardenLedger::from_roster(ROSTER, &[]);
        let mut a = issue(1, Severity::High);
        let mut b = issue(2, Severity::Medium);
        ledger.credit(&mut a, "bob").expect("bob");
        ledger.credit(&mut b, "carol_c").expect("carol");
        ledger.credit(&mut a, "carol_c").expect("carol");

        let sorted: Vec<_> = ledger.sorted_by_findings().iter().map(|w| w.name.clone()).collect();
        assert_eq!(sorted, vec!["carol_c", "bob", "alice", "The_Team"]);

        let pruned = ledger.pruned();
        assert_eq!(pruned.len(), 2);
        assert!(pruned.get("alice").is_none());
        assert_eq!(pruned.get("carol_c").map(Warden::total_findings), Some(2));
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn test_invariant_holds() {
        let mut ledger = LocalWardenLedger::from_roster(ROSTER, &[]);
        for uid in 1..=6 {
            let severity = if uid % 2 == 0 { Severity::High } else { Severity::Medium };
            let mut i = issue(uid, severity);
            ledger.credit(&mut i, "alice").expect("alice");
        }
        for warden in ledger.iter() {
            assert_eq!(
                warden.findings_high() + warden.findings_medium(),
                warden.findings().len() as u32
            );
        }
    }
}
