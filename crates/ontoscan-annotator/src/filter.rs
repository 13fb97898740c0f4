//! Raw span filters: integers, minimum size and stop words.
//!
//! All filters are pure and idempotent; applying them in any order gives
//! the same result.

use ahash::AHashSet;

use crate::span::RawSpan;

const DEFAULT_STOP_WORDS: &str = include_str!("../data/stop_words.txt");

/// Upper-cased stop-word set.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: AHashSet<String>,
}

impl StopWords {
    /// Bundled English list.
    pub fn bundled() -> Self {
        Self::from_list(DEFAULT_STOP_WORDS.lines())
    }

    pub fn from_list<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Comma-separated form, e.g. `"resource, deletion"`.
    pub fn from_csv(csv: &str) -> Self {
        Self::from_list(csv.split(','))
    }

    pub fn contains(&self, text: &str) -> bool {
        !self.words.is_empty() && self.words.contains(&text.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// True when the text is an optionally signed run of ASCII digits.
pub fn is_integer(text: &str) -> bool {
    let t = text.trim();
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn filter_integers(spans: Vec<RawSpan>) -> Vec<RawSpan> {
    spans.into_iter().filter(|s| !is_integer(&s.text)).collect()
}

/// Keep spans strictly longer than `min_size` characters.
pub fn filter_min_size(spans: Vec<RawSpan>, min_size: usize) -> Vec<RawSpan> {
    spans.into_iter().filter(|s| s.len() > min_size).collect()
}

pub fn filter_stop_words(spans: Vec<RawSpan>, stop_words: &StopWords) -> Vec<RawSpan> {
    if stop_words.is_empty() {
        return spans;
    }
    spans.into_iter().filter(|s| !stop_words.contains(&s.text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(from: usize, text: &str) -> RawSpan {
        RawSpan {
            offset_from: from,
            offset_to: from + text.chars().count() - 1,
            fingerprint: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_integer_detection() {
        assert!(is_integer("42"));
        assert!(is_integer("-7"));
        assert!(is_integer("+0012"));
        assert!(!is_integer("4.2"));
        assert!(!is_integer("-"));
        assert!(!is_integer("12a"));
        assert!(!is_integer(""));
    }

    #[test]
    fn test_filter_integers() {
        let spans = vec![span(1, "1990"), span(6, "CT"), span(9, "-12")];
        let kept = filter_integers(spans);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "CT");
    }

    #[test]
    fn test_min_size_is_strict() {
        let spans = vec![span(1, "abc"), span(5, "abcd"), span(10, "abcdefgh")];
        let kept = filter_min_size(spans, 4);
        assert_eq!(kept.iter().map(|s| s.text.as_str()).collect::<Vec<_>>(), vec!["abcdefgh"]);
    }

    #[test]
    fn test_stop_words() {
        let words = StopWords::from_csv("resource, Deletion");
        assert_eq!(words.len(), 2);
        let spans = vec![span(1, "Resource"), span(10, "deletion"), span(20, "Data Storage")];
        let kept = filter_stop_words(spans.clone(), &words);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "Data Storage");

        let cleared = StopWords::from_list(Vec::<String>::new());
        assert_eq!(filter_stop_words(spans, &cleared).len(), 3);
    }

    #[test]
    fn test_filters_idempotent() {
        let words = StopWords::bundled();
        assert!(words.contains("the"));
        let spans = vec![span(1, "THE"), span(5, "123"), span(9, "Gene"), span(14, "ab")];
        let once = filter_min_size(filter_integers(filter_stop_words(spans, &words)), 2);
        let twice = filter_min_size(filter_integers(filter_stop_words(once.clone(), &words)), 2);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
    }
}
