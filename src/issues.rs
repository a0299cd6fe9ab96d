//! High/Medium finding extraction
//!
//! Picks the risk-finding sections out of a segmented report and parses
//! each issue header into severity, sequence id and title.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{excerpt, ReportError};
use crate::markdown::{self, Segment, DETAILS, TOPIC};

const RISK_TOPICS: [&str; 2] = ["High Risk Findings", "Medium Risk Findings"];

lazy_static! {
    /// Header grammars, tried in order. The first match wins.
    static ref ISSUE_HEADER_GRAMMARS: Vec<(&'static str, Regex)> = vec![
        (
            "linked",
            Regex::new(r"## \[\[(H|M)-(\d+)\] ((?:\[[^\]]*\]|[^\]])*)\]\(https?://[^\)]+\)")
                .expect("linked issue header regex is valid"),
        ),
        (
            "plain",
            Regex::new(r"## \[(H|M)-(\d+)\] (.*)").expect("plain issue header regex is valid"),
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
}

impl Severity {
    pub fn code(&self) -> char {
        match self {
            Severity::High => 'H',
            Severity::Medium => 'M',
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "H" => Ok(Severity::High),
            "M" => Ok(Severity::Medium),
            other => Err(format!("unsupported severity: {}", other)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Parsed `[H-02] Title` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueHeader {
    pub severity: Severity,
    pub sequence_id: u32,
    pub title: String,
}

/// One risk finding section split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSection {
    pub description: String,
    pub impact: Option<String>,
    pub proof_of_concept: Option<String>,
}

/// An accepted finding, owned by the contest that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub severity: Severity,
    pub sequence_id: u32,
    /// Contest scoped, starts at 1.
    pub uid: u32,
    /// Names of the wardens credited with this issue.
    pub attributions: Vec<String>,
    pub repo_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_of_concept: Option<String>,
}

impl Issue {
    pub fn new(header: IssueHeader, uid: u32, repo_name: &str) -> Self {
        Self {
            title: header.title,
            severity: header.severity,
            sequence_id: header.sequence_id,
            uid,
            attributions: Vec::new(),
            repo_name: repo_name.to_string(),
            impact: None,
            proof_of_concept: None,
        }
    }

    /// `3-[H-02]` style label used in logs.
    pub fn label(&self) -> String {
        format!("{}-[{}-{:02}]", self.uid, self.severity, self.sequence_id)
    }
}

pub fn is_risk_segment(segment: &Segment) -> bool {
    segment
        .header(TOPIC)
        .is_some_and(|topic| RISK_TOPICS.iter().any(|t| topic.contains(t)))
}

/// Keep the High/Medium sections of a segmented report, split into parts.
pub fn extract_sections(segments: &[Segment]) -> Vec<IssueSection> {
    let sections: Vec<IssueSection> = segments
        .iter()
        .filter(|s| is_risk_segment(s))
        .map(|s| split_section(&s.content))
        .collect();
    debug!("Found {} high and medium severity sections", sections.len());
    sections
}

/// Split one issue on `###` headers into description, impact and PoC.
pub fn split_section(content: &str) -> IssueSection {
    let parts = markdown::split(content, &markdown::detail_rules(), true);

    let mut section = IssueSection {
        description: String::new(),
        impact: None,
        proof_of_concept: None,
    };

    let mut details = parts.iter();
    if let Some(first) = parts.first() {
        if first.header(DETAILS).is_none() {
            section.description = first.content.clone();
            details.next();
        }
    }

    for part in details {
        let Some(label) = part.header(DETAILS) else {
            continue;
        };
        if label.contains("Impact") {
            section.impact = Some(part.content.clone());
        }
        if label.contains("Proof of Concept") {
            section.proof_of_concept = Some(part.content.clone());
        }
    }

    section
}

/// Parse the issue header at the top of a description.
pub fn parse_issue_header(text: &str) -> Result<IssueHeader, ReportError> {
    let unrecognized = || ReportError::UnrecognizedIssueHeader {
        header: excerpt(text),
    };

    if !text.starts_with("## [") && !text.starts_with("# ") {
        return Err(unrecognized());
    }

    for (name, grammar) in ISSUE_HEADER_GRAMMARS.iter() {
        let Some(caps) = grammar.captures(text) else {
            debug!("Issue header did not match the {} grammar", name);
            continue;
        };
        let severity: Severity = caps[1].parse().map_err(|_| unrecognized())?;
        let sequence_id: u32 = caps[2].parse().map_err(|_| unrecognized())?;
        return Ok(IssueHeader {
            severity,
            sequence_id,
            title: caps[3].trim().to_string(),
        });
    }

    Err(unrecognized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::report_rules;

    #[test]
    fn test_linked_header() {
        let header = parse_issue_header("## [[H-02] Reentrancy bug](https://x.example/2)")
            .expect("linked header parses");
        assert_eq!(header.severity, Severity::High);
        assert_eq!(header.sequence_id, 2);
        assert_eq!(header.title, "Reentrancy bug");
    }

    #[test]
    fn test_plain_header() {
        let header = parse_issue_header("## [M-01] Oracle staleness").expect("plain header");
        assert_eq!(header.severity, Severity::Medium);
        assert_eq!(header.sequence_id, 1);
        assert_eq!(header.title, "Oracle staleness");
    }

    #[test]
    fn test_linked_title_with_brackets() {
        let header = parse_issue_header(
            "## [[M-11] `withdraw()` in [Vault] ignores fees](http://example.org/issues/11)",
        )
        .expect("header with brackets");
        assert_eq!(header.sequence_id, 11);
        assert_eq!(header.title, "`withdraw()` in [Vault] ignores fees");
    }

    #[test]
    fn test_header_found_after_topic_line() {
        let text = "# High Risk Findings (3)\n## [[H-01] First](https://example.com/1)\nbody";
        let header = parse_issue_header(text).expect("header after topic");
        assert_eq!(header.sequence_id, 1);
        assert_eq!(header.title, "First");
    }

    #[test]
    fn test_unrecognized_headers() {
        for text in [
            "Some prose",
            "## [L-01] Low severity",
            "## Summary",
            "# Gas Optimizations",
        ] {
            let err = parse_issue_header(text).expect_err(text);
            assert!(matches!(err, ReportError::UnrecognizedIssueHeader { .. }));
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_split_section_classifies_details() {
        let content = "## [[H-01] Bug](https://example.com/1)\n*Submitted by alice*\n\n\
            ### Impact\nLoss of funds\n\n### Proof of Concept\nStep 1\n\n### Recommended Mitigation Steps\nFix it";
        let section = split_section(content);
        assert!(section.description.starts_with("## [[H-01] Bug]"));
        assert!(section.description.contains("*Submitted by alice*"));
        assert_eq!(section.impact.as_deref(), Some("Loss of funds"));
        assert_eq!(section.proof_of_concept.as_deref(), Some("Step 1"));
    }

    #[test]
    fn test_split_section_without_details() {
        let section = split_section("## [M-03] Thing\n_Submitted by bob_");
        assert_eq!(section.description, "## [M-03] Thing\n_Submitted by bob_");
        assert_eq!(section.impact, None);
        assert_eq!(section.proof_of_concept, None);
    }

    #[test]
    fn test_topic_filter() {
        let report = "# Overview\ntext\n# High Risk Findings (1)\n## [H-01] A\n*Submitted by x*\n\
            # Medium Risk Findings (1)\n## [M-01] B\n*Submitted by y*\n# Low Risk and Non-Critical Issues\n## [L-01] C";
        let segments = markdown::split(report, &report_rules(), false);
        let sections = extract_sections(&segments);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].description.contains("[H-01] A"));
        assert!(sections[1].description.contains("[M-01] B"));
    }

    #[test]
    fn test_issue_label() {
        let header = parse_issue_header("## [H-02] Thing").expect("header");
        let issue = Issue::new(header, 5, "2023-01-test");
        assert_eq!(issue.label(), "5-[H-02]");
    }
}
