//! "Submitted by" line tokenizer
//!
//! Turns prose like `*Submitted by alice (team), also found by bob and carol*`
//! into an ordered list of warden names. Parenthetical content is dropped
//! entirely, link brackets are ignored, and commas at the top level separate
//! names.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{excerpt, ReportError};

const SUBMITTED_BY: &str = "Submitted by ";
const EMPHASIS: [char; 2] = ['*', '_'];
const TRAILING_EMPHASIS: [&str; 4] = ["*.", ".*", "*", "_"];

/// Replace the HTML/markdown escapes reports use for underscores.
pub fn unescape_underscores(text: &str) -> String {
    text.replace("&#95;", "_")
        .replace("\\_", "_")
        .replace("&lowbar;", "_")
}

/// Find the `*Submitted by ...` line in an issue description and tokenize it.
pub fn extract_submitters(
    description: &str,
    typos: &HashMap<String, String>,
) -> Result<Vec<String>, ReportError> {
    let line = find_submitter_line(description).ok_or_else(|| {
        ReportError::MalformedSubmitterLine {
            excerpt: excerpt(description),
        }
    })?;
    debug!("Raw submitter line: {}", line);
    parse_submitter_line(line, typos)
}

/// First line starting with an emphasized "Submitted by " marker.
pub fn find_submitter_line(description: &str) -> Option<&str> {
    description.lines().map(str::trim).find(|line| {
        EMPHASIS.iter().any(|e| {
            line.strip_prefix(*e)
                .is_some_and(|rest| rest.starts_with(SUBMITTED_BY))
        })
    })
}

/// Normalize and tokenize one submitter line.
pub fn parse_submitter_line(
    line: &str,
    typos: &HashMap<String, String>,
) -> Result<Vec<String>, ReportError> {
    let cleaned = normalize(line);
    debug!("Cleaned submitter line: {}", cleaned);

    let names = SubmitterTokenizer::new(typos).run(&cleaned)?;
    debug!("Submitters: {:?}", names);
    Ok(names)
}

/// Strip the marker, fold conjunctions into commas, unescape underscores and
/// drop one closing emphasis sequence at the very end of the line.
pub fn normalize(line: &str) -> String {
    let line = line.trim();
    let body = line.strip_prefix(EMPHASIS).unwrap_or(line);
    let body = body.strip_prefix(SUBMITTED_BY).unwrap_or(body);

    let body = body
        .replace("also found by ", ", ")
        .replace(" and ", ", ");
    let body = unescape_underscores(&body);
    let body = body.trim_end();

    for ending in TRAILING_EMPHASIS {
        if let Some(stripped) = body.strip_suffix(ending) {
            return stripped.to_string();
        }
    }
    body.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Default,
    InParens(usize),
}

/// Single pass scanner over a normalized submitter line.
pub struct SubmitterTokenizer<'a> {
    typos: &'a HashMap<String, String>,
    state: ScanState,
    buffer: String,
    names: Vec<String>,
}

impl<'a> SubmitterTokenizer<'a> {
    pub fn new(typos: &'a HashMap<String, String>) -> Self {
        Self {
            typos,
            state: ScanState::Default,
            buffer: String::new(),
            names: Vec::new(),
        }
    }

    pub fn run(mut self, line: &str) -> Result<Vec<String>, ReportError> {
        for (column, c) in line.chars().enumerate() {
            self.state = match (self.state, c) {
                (ScanState::Default, '(') => ScanState::InParens(1),
                (ScanState::InParens(depth), '(') => ScanState::InParens(depth + 1),
                (ScanState::Default, ')') => {
                    return Err(ReportError::UnmatchedParenthesis {
                        line: line.to_string(),
                        column,
                    })
                }
                (ScanState::InParens(1), ')') => ScanState::Default,
                (ScanState::InParens(depth), ')') => ScanState::InParens(depth - 1),
                (state, '[' | ']') => state,
                (ScanState::Default, ',') => {
                    self.flush(true);
                    ScanState::Default
                }
                (ScanState::Default, c) => {
                    self.buffer.push(c);
                    ScanState::Default
                }
                (state @ ScanState::InParens(_), _) => state,
            };
        }

        // The final name skips typo correction, matching how reports were
        // historically scored.
        self.flush(false);
        Ok(self.names)
    }

    fn flush(&mut self, correct_typos: bool) {
        let name = self.buffer.trim();
        if !name.is_empty() {
            let name = match self.typos.get(name) {
                Some(fixed) if correct_typos => fixed.clone(),
                _ => name.to_string(),
            };
            self.names.push(name);
        }
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Vec<String> {
        parse_submitter_line(line, &HashMap::new()).expect("line parses")
    }

    #[test]
    fn test_conjunction_and_parenthetical() {
        assert_eq!(
            parse("*Submitted by alice, bob (lead), and carol*"),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn test_parenthetical_content_is_discarded() {
        assert_eq!(parse("Submitted by a1(via b1), a2"), vec!["a1", "a2"]);
    }

    #[test]
    fn test_nested_parens_and_links() {
        assert_eq!(
            parse("*Submitted by [team](https://x.io/team) ([m1](https://x.io/m1) (x), m2), [solo](https://x.io/s)*"),
            vec!["team", "solo"]
        );
    }

    #[test]
    fn test_also_found_by() {
        assert_eq!(
            parse("_Submitted by alice, also found by bob, carol and dave_"),
            vec!["alice", "bob", "carol", "dave"]
        );
    }

    #[test]
    fn test_typo_table_applies_to_mid_line_names() {
        let typos = HashMap::from([("_141345_".to_string(), "__141345__".to_string())]);
        let names = parse_submitter_line("*Submitted by _141345_, bob*", &typos).expect("parses");
        assert_eq!(names, vec!["__141345__", "bob"]);
    }

    #[test]
    fn test_typo_table_skips_final_name() {
        let typos = HashMap::from([("bob".to_string(), "robert".to_string())]);
        let names = parse_submitter_line("*Submitted by bob, bob*", &typos).expect("parses");
        assert_eq!(names, vec!["robert", "bob"]);
    }

    #[test]
    fn test_escaped_underscores() {
        assert_eq!(
            parse("*Submitted by a&#95;b, c\\_d, e&lowbar;f*"),
            vec!["a_b", "c_d", "e_f"]
        );
    }

    #[test]
    fn test_trailing_emphasis_variants() {
        assert_eq!(normalize("*Submitted by alice*."), "alice");
        assert_eq!(normalize("*Submitted by alice.*"), "alice");
        assert_eq!(normalize("*Submitted by alice*"), "alice");
        assert_eq!(normalize("_Submitted by alice_"), "alice");
        // Only one closing sequence is removed.
        assert_eq!(normalize("*Submitted by alice**"), "alice*");
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(parse("*Submitted by x, y, x*"), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_unmatched_parenthesis_is_fatal() {
        let err = parse_submitter_line("*Submitted by alice), bob*", &HashMap::new())
            .expect_err("unmatched paren");
        assert!(matches!(
            err,
            ReportError::UnmatchedParenthesis { column: 5, .. }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unclosed_parenthesis_drops_rest() {
        assert_eq!(parse("*Submitted by alice (and bob*"), vec!["alice"]);
    }

    #[test]
    fn test_missing_submitter_line() {
        let err = extract_submitters("## [H-01] Thing\nNo credits here", &HashMap::new())
            .expect_err("missing line");
        assert!(matches!(err, ReportError::MalformedSubmitterLine { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_extract_from_description() {
        let description = "## [[H-01] Bug](https://example.com/1)\n\n*Submitted by alice, also found by bob*\n\nMore text";
        let names = extract_submitters(description, &HashMap::new()).expect("extracts");
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_deterministic() {
        let line = "*Submitted by a (x (y)), b, [c](https://c.io) and d*";
        let first = parse(line);
        for _ in 0..5 {
            assert_eq!(parse(line), first);
        }
        assert_eq!(first, vec!["a", "b", "c", "d"]);
    }
}
