//! Report processing errors
//!
//! Fatal variants stop a strict run; the rest are logged and skipped.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// Issue description has no emphasized "Submitted by" line.
    #[error("no \"Submitted by\" line found in issue: {excerpt}")]
    MalformedSubmitterLine { excerpt: String },

    /// Closing parenthesis with nothing open.
    #[error("unmatched closing parenthesis at column {column} in submitter line '{line}'")]
    UnmatchedParenthesis { line: String, column: usize },

    /// Neither issue header grammar matched.
    #[error("unrecognized issue header: {header}")]
    UnrecognizedIssueHeader { header: String },

    /// Submitter is not in the roster and is not a known bot.
    #[error("submitter '{name}' is not listed in the warden roster")]
    UnresolvedSubmitterName { name: String },

    #[error("no High or Medium severity issues found in {repo}")]
    EmptyContestReport { repo: String },

    #[error("no warden roster found in {repo}")]
    MissingWardenRoster { repo: String },

    #[error("top percentile must be between 0.0 and 0.99, got {value}")]
    InvalidPercentile { value: f64 },
}

impl ReportError {
    /// Whether this error aborts the run when strict mode is on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReportError::MalformedSubmitterLine { .. }
                | ReportError::UnmatchedParenthesis { .. }
                | ReportError::InvalidPercentile { .. }
        )
    }
}

/// Short single-line excerpt used in error messages.
pub(crate) fn excerpt(text: &str) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.chars().count() > 60 {
        let cut: String = first.chars().take(60).collect();
        format!("{}...", cut)
    } else {
        first.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ReportError::MalformedSubmitterLine {
            excerpt: String::new()
        }
        .is_fatal());
        assert!(ReportError::UnmatchedParenthesis {
            line: "a)".to_string(),
            column: 1
        }
        .is_fatal());
        assert!(ReportError::InvalidPercentile { value: 1.5 }.is_fatal());
        assert!(!ReportError::EmptyContestReport {
            repo: "2023-01-x".to_string()
        }
        .is_fatal());
        assert!(!ReportError::UnresolvedSubmitterName {
            name: "ghost".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_excerpt_truncates_first_line() {
        assert_eq!(excerpt("short\nsecond"), "short");
        let long = "x".repeat(80);
        assert_eq!(excerpt(&long), format!("{}...", "x".repeat(60)));
    }
}
