//! Raw spans returned by a recognizer and the text plumbing around them.
//!
//! Offsets are 1-based, inclusive and counted in characters of the
//! ORIGINAL input text. Normalization maps every character to exactly one
//! character so offsets computed on the normalized text stay valid for the
//! original.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A candidate match before any cache lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpan {
    pub offset_from: usize,
    pub offset_to: usize,
    pub fingerprint: u32,
    /// Slice of the original text covered by the span.
    pub text: String,
}

impl RawSpan {
    /// Length in characters, `to - from + 1`.
    pub fn len(&self) -> usize {
        self.offset_to + 1 - self.offset_from
    }

    pub fn is_empty(&self) -> bool {
        self.offset_to < self.offset_from
    }
}

/// Upper-case and replace line breaks by spaces, one character in, one out.
///
/// Characters whose upper-case form expands to several characters (`ß`)
/// are kept as-is.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            c => {
                let mut upper = c.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(u), None) => u,
                    _ => c,
                }
            }
        })
        .collect()
}

/// Character-offset view over a string.
pub struct CharIndex<'a> {
    text: &'a str,
    /// Byte offset of every char, plus a trailing `text.len()`.
    starts: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        starts.push(text.len());
        Self { text, starts }
    }

    pub fn char_len(&self) -> usize {
        self.starts.len() - 1
    }

    /// Substring for 1-based inclusive char offsets.
    pub fn slice(&self, from: usize, to: usize) -> Option<&'a str> {
        if from == 0 || to < from || to > self.char_len() {
            return None;
        }
        Some(&self.text[self.starts[from - 1]..self.starts[to]])
    }

    /// 0-based char position of a byte offset that falls on a char boundary.
    pub fn char_at_byte(&self, byte: usize) -> Option<usize> {
        self.starts.binary_search(&byte).ok()
    }
}

/// Parse one `fingerprint\tfrom\tto` reply line.
///
/// Lines with fewer than two fields are not span rows and yield `None`.
pub fn parse_reply_line(line: &str) -> Option<(u32, usize, usize)> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 2 {
        return None;
    }
    let parsed = (
        fields[0].trim().parse::<u32>(),
        fields[1].trim().parse::<usize>(),
        fields.get(2).map(|f| f.trim().parse::<usize>()),
    );
    match parsed {
        (Ok(fp), Ok(from), Some(Ok(to))) => Some((fp, from, to)),
        _ => {
            warn!(line = %line, "Skipping malformed span matcher row");
            None
        }
    }
}

/// Attach original-text slices to parsed rows, dropping out-of-range rows.
pub fn build_spans(original: &str, rows: impl IntoIterator<Item = (u32, usize, usize)>) -> Vec<RawSpan> {
    let index = CharIndex::new(original);
    rows.into_iter()
        .filter_map(|(fingerprint, from, to)| match index.slice(from, to) {
            Some(text) => Some(RawSpan {
                offset_from: from,
                offset_to: to,
                fingerprint,
                text: text.to_string(),
            }),
            None => {
                warn!(from, to, len = index.char_len(), "Span offsets outside input text");
                None
            }
        })
        .collect()
}

/// Parse a full reply body (REST recognizer) into spans.
pub fn parse_reply_body(original: &str, body: &str) -> Vec<RawSpan> {
    build_spans(original, body.lines().filter_map(parse_reply_line))
}
