//! Fuzzy search for Folio.
//!
//! This module provides the matching and ranking logic behind a catalog's
//! `find` operation:
//!
//! - Case-insensitive longest-common-substring scoring between a query and a
//!   book's combined title-and-authors text
//! - A match threshold that tolerates up to two characters of slop
//! - An explicit, reusable cache of per-book match lengths for one query
//!
//! ## Scoring
//!
//! The score of a (query, book) pair is the length of the longest *contiguous*
//! run of characters the folded query shares with the folded book text,
//! computed with the classic dynamic-programming table over codepoints. A book
//! qualifies when its score is strictly greater than `len(query) - 3`; the
//! threshold is signed, so queries shorter than three characters match every
//! book.
//!
//! ## Performance
//!
//! Scoring one pair is O(|query| x |text|) time and O(|text|) space (rolling
//! two-row table). Book texts are short, so `find` is dominated by the number
//! of distinct books, not the number of copies.

use crate::types::Book;
use std::collections::HashMap;
use std::sync::Arc;

/// Number of characters a match may fall short of the query length and still
/// qualify.
pub const MATCH_SLACK: isize = 3;

/// Fold text for case-insensitive comparison.
pub(crate) fn fold(text: &str) -> Vec<char> {
    text.to_lowercase().chars().collect()
}

/// A compiled fuzzy query ready for scoring.
///
/// Queries are folded once at construction and can be reused to score many
/// candidate texts.
///
/// # Example
/// ```
/// use folio_core::FuzzyQuery;
/// let query = FuzzyQuery::new("Normal Book");
/// assert_eq!(query.match_len("A Normal Book Indeed"), 11);
/// ```
#[derive(Debug, Clone)]
pub struct FuzzyQuery {
    /// The query text as given
    raw: String,

    /// Case-folded query text, used as the cache key
    folded_text: String,

    /// Case-folded query codepoints, used for scoring
    folded: Vec<char>,

    /// Minimum qualifying score, exclusive
    threshold: isize,
}

impl FuzzyQuery {
    /// Compile a fuzzy query.
    pub fn new(text: &str) -> Self {
        let folded_text = text.to_lowercase();
        let folded: Vec<char> = folded_text.chars().collect();
        let threshold = folded.len() as isize - MATCH_SLACK;
        FuzzyQuery {
            raw: text.to_string(),
            folded_text,
            folded,
            threshold,
        }
    }

    /// The query text as given
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The folded query text, the key under which scores are cached
    pub(crate) fn folded_text(&self) -> &str {
        &self.folded_text
    }

    /// Length of the longest common substring between this query and `text`,
    /// case-insensitively.
    pub fn match_len(&self, text: &str) -> usize {
        self.match_len_folded(&fold(text))
    }

    /// Score against already-folded text.
    pub(crate) fn match_len_folded(&self, text: &[char]) -> usize {
        if self.folded.is_empty() || text.is_empty() {
            return 0;
        }

        // table[i][j] = length of the common run ending at query[i] / text[j];
        // only the previous row is live at any point
        let mut prev = vec![0usize; text.len() + 1];
        let mut curr = vec![0usize; text.len() + 1];
        let mut best = 0;

        for &qc in &self.folded {
            for (j, &tc) in text.iter().enumerate() {
                curr[j + 1] = if qc == tc { prev[j] + 1 } else { 0 };
                if curr[j + 1] > best {
                    best = curr[j + 1];
                }
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        best
    }

    /// Whether a match of length `len` qualifies for this query.
    pub fn qualifies(&self, len: usize) -> bool {
        len as isize > self.threshold
    }
}

/// Cached per-book match lengths for one query.
///
/// The cache is an explicit value rather than ambient catalog state: it maps
/// (folded query text) to (book -> match length) and is cleared whenever the
/// query text changes. Scores depend only on the query and the book's
/// immutable text, so acquiring and losing copies never invalidates it.
#[derive(Debug, Default)]
pub(crate) struct MatchCache {
    /// Folded query text the cached scores were computed under
    query: Option<String>,

    /// Match length per book for that query
    scores: HashMap<Arc<Book>, usize>,
}

impl MatchCache {
    /// Create an empty cache.
    pub(crate) fn new() -> Self {
        MatchCache::default()
    }

    /// Score `book` against `query`, reusing a cached result when one exists.
    ///
    /// `text` must be the folded form of `book.search_text()`.
    pub(crate) fn score(&mut self, query: &FuzzyQuery, book: &Arc<Book>, text: &[char]) -> usize {
        if self.query.as_deref() != Some(query.folded_text()) {
            self.scores.clear();
            self.query = Some(query.folded_text().to_string());
        }

        if let Some(&len) = self.scores.get(book.as_ref()) {
            return len;
        }

        let len = query.match_len_folded(text);
        self.scores.insert(Arc::clone(book), len);
        len
    }

    #[cfg(test)]
    fn cached_books(&self) -> usize {
        self.scores.len()
    }
}

/// Order search hits: longer match first, then more recent year, then title
/// ascending. The trailing author comparison makes the order total, so
/// repeated queries against an unchanged catalog return identical lists.
pub(crate) fn rank(hits: &mut [(Arc<Book>, usize)]) {
    hits.sort_by(|(a, a_len), (b, b_len)| {
        b_len
            .cmp(a_len)
            .then_with(|| b.year().cmp(&a.year()))
            .then_with(|| a.title().cmp(b.title()))
            .then_with(|| a.authors().cmp(b.authors()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, year: u32) -> Arc<Book> {
        Arc::new(Book::new(title, vec![author.to_string()], year))
    }

    #[test]
    fn test_match_len_exact() {
        let query = FuzzyQuery::new("Normal Book");
        assert_eq!(query.match_len("Normal Book"), 11);
    }

    #[test]
    fn test_match_len_substring() {
        let query = FuzzyQuery::new("Normal Book");
        // "anormal book" contains the whole folded query
        assert_eq!(query.match_len("ANormal Book"), 11);
        // one character short of the query
        assert_eq!(query.match_len("Normal Boo"), 10);
    }

    #[test]
    fn test_match_len_case_insensitive() {
        let query = FuzzyQuery::new("NORMAL book");
        assert_eq!(query.match_len("normal BOOK"), 11);
    }

    #[test]
    fn test_match_len_is_substring_not_subsequence() {
        let query = FuzzyQuery::new("abcdef");
        // "abc" and "def" are separate runs; the longest single run is 3
        assert_eq!(query.match_len("abcxdef"), 3);
    }

    #[test]
    fn test_match_len_empty() {
        assert_eq!(FuzzyQuery::new("").match_len("anything"), 0);
        assert_eq!(FuzzyQuery::new("anything").match_len(""), 0);
        assert_eq!(FuzzyQuery::new("").match_len(""), 0);
    }

    #[test]
    fn test_match_len_unicode_folding() {
        let query = FuzzyQuery::new("CAFÉ");
        assert_eq!(query.match_len("café society"), 4);
    }

    #[test]
    fn test_qualifies_threshold_is_exclusive() {
        let query = FuzzyQuery::new("Normal Book"); // 11 chars, threshold 8
        assert!(query.qualifies(11));
        assert!(query.qualifies(9));
        assert!(!query.qualifies(8));
        assert!(!query.qualifies(0));
    }

    #[test]
    fn test_short_query_matches_everything() {
        // threshold goes negative, so even a zero-length match qualifies
        let query = FuzzyQuery::new("ab");
        assert!(query.qualifies(0));

        let empty = FuzzyQuery::new("");
        assert!(empty.qualifies(0));
    }

    #[test]
    fn test_cache_reuses_scores_for_same_query() {
        let mut cache = MatchCache::new();
        let query = FuzzyQuery::new("Normal Book");
        let normal = book("Normal Book", "Normal Author", 1992);
        let text = fold(&normal.search_text());

        assert_eq!(cache.score(&query, &normal, &text), 11);
        assert_eq!(cache.cached_books(), 1);

        // A second scoring of the same pair hits the cache
        assert_eq!(cache.score(&query, &normal, &text), 11);
        assert_eq!(cache.cached_books(), 1);

        // Folding differences in the query text do not invalidate
        let refolded = FuzzyQuery::new("normal book");
        assert_eq!(cache.score(&refolded, &normal, &text), 11);
        assert_eq!(cache.cached_books(), 1);
    }

    #[test]
    fn test_cache_cleared_when_query_changes() {
        let mut cache = MatchCache::new();
        let normal = book("Normal Book", "Normal Author", 1992);
        let text = fold(&normal.search_text());

        let first = FuzzyQuery::new("Normal Book");
        cache.score(&first, &normal, &text);
        assert_eq!(cache.cached_books(), 1);

        let second = FuzzyQuery::new("Author");
        assert_eq!(cache.score(&second, &normal, &text), 6);
        assert_eq!(cache.cached_books(), 1);
    }

    #[test]
    fn test_rank_longer_match_first() {
        let exact = book("Normal Book", "Normal Author", 1992);
        let shorter = book("Normal Boo", "normal author", 1992);
        let mut hits = vec![(Arc::clone(&shorter), 10), (Arc::clone(&exact), 11)];
        rank(&mut hits);
        assert_eq!(hits[0].0, exact);
        assert_eq!(hits[1].0, shorter);
    }

    #[test]
    fn test_rank_newer_year_breaks_ties() {
        let older = book("Normal Book", "Normal Author", 1992);
        let newer = book("Normal Book", "normal author", 1995);
        let mut hits = vec![(Arc::clone(&older), 11), (Arc::clone(&newer), 11)];
        rank(&mut hits);
        assert_eq!(hits[0].0, newer);
        assert_eq!(hits[1].0, older);
    }

    #[test]
    fn test_rank_title_breaks_remaining_ties() {
        let normal = book("Normal Book", "Normal Author", 1992);
        let a_normal = book("ANormal Book", "Normal Author", 1992);
        let mut hits = vec![(Arc::clone(&normal), 11), (Arc::clone(&a_normal), 11)];
        rank(&mut hits);
        assert_eq!(hits[0].0, a_normal);
        assert_eq!(hits[1].0, normal);
    }

    #[test]
    fn test_rank_is_total() {
        let by_ada = book("Normal Book", "Ada", 1992);
        let by_zed = book("Normal Book", "Zed", 1992);
        let mut hits = vec![(Arc::clone(&by_zed), 11), (Arc::clone(&by_ada), 11)];
        rank(&mut hits);
        assert_eq!(hits[0].0, by_ada);
        assert_eq!(hits[1].0, by_zed);
    }
}
