//! In-process recognizer over the dictionary export.
//!
//! Builds an Aho-Corasick automaton from `<fingerprint>\t<term>` lines and
//! reports the same 1-based inclusive character offsets as the mgrep
//! service, so the rest of the pipeline cannot tell the two apart.
//!
//! # Performance
//! - Linear in text length, no network round-trip
//! - Memory grows with the number of dictionary terms

use std::io::BufRead;
use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use async_trait::async_trait;
use ontoscan_common::{OntoscanError, Result};
use tracing::{info, warn};

use super::Recognizer;
use crate::span::{build_spans, normalize_text, CharIndex, RawSpan};

pub struct DictionaryRecognizer {
    automaton: AhoCorasick,
    /// Pattern index -> term fingerprint.
    fingerprints: Vec<u32>,
}

impl DictionaryRecognizer {
    /// Build from `(fingerprint, term)` pairs. Terms are normalized to upper case.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut fingerprints: Vec<u32> = Vec::new();

        for (fp, term) in entries {
            let term = normalize_text(term.as_ref().trim());
            if term.is_empty() {
                continue;
            }
            patterns.push(term);
            fingerprints.push(fp);
        }

        // Standard semantics so overlapping matches can be reported.
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| OntoscanError::Config(format!("cannot build dictionary automaton: {e}")))?;

        info!("DictionaryRecognizer loaded {} terms", patterns.len());
        Ok(Self { automaton, fingerprints })
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((fp, term)) => match fp.trim().parse::<u32>() {
                    Ok(fp) => entries.push((fp, term.to_string())),
                    Err(_) => warn!(line = lineno + 1, "Bad fingerprint in dictionary file"),
                },
                None => warn!(line = lineno + 1, "Dictionary line without tab separator"),
            }
        }
        Self::from_entries(entries)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            OntoscanError::Config(format!("cannot open dictionary {}: {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Synchronous matching, returns `(fingerprint, from, to)` rows.
    pub fn find(&self, text: &str, longest_only: bool, whole_word_only: bool) -> Vec<(u32, usize, usize)> {
        let normalized = normalize_text(text);
        let index = CharIndex::new(&normalized);
        let chars: Vec<char> = normalized.chars().collect();

        let mut rows: Vec<(u32, usize, usize)> = Vec::new();
        for mat in self.automaton.find_overlapping_iter(&normalized) {
            let (Some(start), Some(end)) = (index.char_at_byte(mat.start()), index.char_at_byte(mat.end()))
            else {
                continue;
            };
            if whole_word_only && !is_word_bounded(&chars, start, end) {
                continue;
            }
            rows.push((self.fingerprints[mat.pattern().as_usize()], start + 1, end));
        }

        rows.sort_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));
        rows.dedup();

        if longest_only {
            keep_longest_per_start(rows)
        } else {
            rows
        }
    }
}

/// `start` and `end` are 0-based char positions, `end` exclusive.
fn is_word_bounded(chars: &[char], start: usize, end: usize) -> bool {
    let before = start == 0 || !chars[start - 1].is_alphanumeric();
    let after = end >= chars.len() || !chars[end].is_alphanumeric();
    before && after
}

/// Rows must be sorted by start, then end descending.
fn keep_longest_per_start(rows: Vec<(u32, usize, usize)>) -> Vec<(u32, usize, usize)> {
    let mut kept: Vec<(u32, usize, usize)> = Vec::with_capacity(rows.len());
    for row in rows {
        match kept.last() {
            Some(&(_, from, to)) if from == row.1 && to > row.2 => {}
            _ => kept.push(row),
        }
    }
    kept
}

#[async_trait]
impl Recognizer for DictionaryRecognizer {
    async fn recognize(
        &self,
        text: &str,
        longest_only: bool,
        whole_word_only: bool,
    ) -> Result<Vec<RawSpan>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(build_spans(text, self.find(text, longest_only, whole_word_only)))
    }

    fn name(&self) -> &'static str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;

    fn recognizer(terms: &[&str]) -> DictionaryRecognizer {
        DictionaryRecognizer::from_entries(terms.iter().map(|t| (fingerprint(t), *t))).unwrap()
    }

    #[test]
    fn test_data_storage_offsets() {
        let r = recognizer(&["Data Storage"]);
        let rows = r.find("Data Storage is needed", false, true);
        assert_eq!(rows, vec![(fingerprint("Data Storage"), 1, 12)]);
    }

    #[test]
    fn test_overlapping_and_longest() {
        let r = recognizer(&["Data", "Data Storage", "Storage"]);
        let all = r.find("data storage", false, true);
        assert_eq!(all.len(), 3);

        let longest = r.find("data storage", true, true);
        assert_eq!(longest.len(), 2);
        assert_eq!((longest[0].1, longest[0].2), (1, 12));
        assert_eq!((longest[1].1, longest[1].2), (6, 12));
    }

    #[test]
    fn test_whole_word_only() {
        let r = recognizer(&["cat"]);
        assert!(r.find("concatenate", false, true).is_empty());
        assert_eq!(r.find("concatenate", false, false).len(), 1);
        assert_eq!(r.find("a cat.", false, true), vec![(fingerprint("cat"), 3, 5)]);
    }

    #[test]
    fn test_from_reader_skips_bad_lines() {
        let input = "12\tHEART\nbad line\nx\tLUNG\n\n34\tLIVER\n";
        let r = DictionaryRecognizer::from_reader(input.as_bytes()).unwrap();
        assert_eq!(r.len(), 2);
    }

    #[tokio::test]
    async fn test_recognize_multibyte_offsets() {
        let r = recognizer(&["Zöliakie"]);
        let spans = r.recognize("Über Zöliakie", false, true).await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].offset_from, spans[0].offset_to), (6, 13));
        assert_eq!(spans[0].text, "Zöliakie");
    }
}
