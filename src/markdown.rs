//! Markdown segmentation by header hierarchy
//!
//! Splits a report into ordered segments, each tagged with the headers that
//! enclose it. Only the header markers passed in are treated as structure;
//! everything else, including deeper headers, is plain content.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

/// A header marker and the label its text is recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRule {
    pub marker: String,
    pub label: String,
}

impl HeaderRule {
    pub fn new(marker: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            label: label.into(),
        }
    }

    fn level(&self) -> usize {
        self.marker.chars().filter(|c| *c == '#').count()
    }

    fn matches(&self, line: &str) -> bool {
        match line.strip_prefix(self.marker.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(' '),
            None => false,
        }
    }
}

pub const TOPIC: &str = "Topic";
pub const ITEM: &str = "Item";
pub const DETAILS: &str = "Details";

/// `#` -> Topic, `##` -> Item. Used for a whole report.
pub fn report_rules() -> Vec<HeaderRule> {
    vec![HeaderRule::new("#", TOPIC), HeaderRule::new("##", ITEM)]
}

/// `###` -> Details. Used inside a single issue.
pub fn detail_rules() -> Vec<HeaderRule> {
    vec![HeaderRule::new("###", DETAILS)]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub level: usize,
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Enclosing headers, outermost first.
    pub headers: Vec<HeaderEntry>,
    pub content: String,
}

impl Segment {
    /// Header text recorded under `label`, if that level has been set.
    pub fn header(&self, label: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.label == label)
            .map(|h| h.text.as_str())
    }
}

/// Split `text` into segments using `rules`.
///
/// A header at level L closes every open header at level >= L. Blank lines
/// end a paragraph; adjacent paragraphs under the same headers are merged.
/// Fenced code blocks are copied verbatim and never produce headers.
pub fn split(text: &str, rules: &[HeaderRule], strip_headers: bool) -> Vec<Segment> {
    let mut rules: Vec<&HeaderRule> = rules.iter().collect();
    rules.sort_by(|a, b| b.marker.len().cmp(&a.marker.len()));

    let fences = fenced_ranges(text);
    let in_fence = |start: usize, end: usize| fences.iter().any(|r| r.start < end && start < r.end);

    let mut path: Vec<HeaderEntry> = Vec::new();
    let mut chunks: Vec<Segment> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim();

        if in_fence(start, offset) {
            current.push(line);
            continue;
        }

        if let Some(rule) = rules.iter().find(|r| r.matches(line)) {
            flush(&mut chunks, &path, &mut current);
            let level = rule.level();
            path.retain(|h| h.level < level);
            path.push(HeaderEntry {
                level,
                label: rule.label.clone(),
                text: line[rule.marker.len()..].trim().to_string(),
            });
            if !strip_headers {
                current.push(line);
            }
            continue;
        }

        if line.is_empty() {
            flush(&mut chunks, &path, &mut current);
        } else {
            current.push(line);
        }
    }
    flush(&mut chunks, &path, &mut current);

    aggregate(chunks, strip_headers)
}

/// Byte ranges of fenced code blocks, fences included.
fn fenced_ranges(text: &str) -> Vec<Range<usize>> {
    Parser::new(text)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => Some(range),
            _ => None,
        })
        .collect()
}

fn flush(chunks: &mut Vec<Segment>, path: &[HeaderEntry], current: &mut Vec<&str>) {
    if current.is_empty() {
        return;
    }
    chunks.push(Segment {
        headers: path.to_vec(),
        content: current.join("\n"),
    });
    current.clear();
}

fn aggregate(chunks: Vec<Segment>, strip_headers: bool) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match out.last_mut() {
            Some(last) if last.headers == chunk.headers => {
                last.content.push_str("\n\n");
                last.content.push_str(&chunk.content);
            }
            // A bare header line followed directly by a deeper section is
            // folded into that section.
            Some(last)
                if !strip_headers
                    && last.headers.len() < chunk.headers.len()
                    && last
                        .content
                        .lines()
                        .last()
                        .is_some_and(|l| l.starts_with('#')) =>
            {
                last.content.push('\n');
                last.content.push_str(&chunk.content);
                last.headers = chunk.headers;
            }
            _ => out.push(chunk),
        }
    }
    out
}
