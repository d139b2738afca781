//! Core data types for Folio.
//!
//! This module defines the fundamental data structures used throughout the
//! catalog and search system. These types are designed to be:
//!
//! - **Value-oriented**: A [`Book`] is identified purely by its content
//! - **Identity-oriented**: A [`BookCopy`] is a handle onto one physical copy,
//!   never interchangeable with another copy of the same book
//! - **Efficient**: Book text is shared between copies, never duplicated

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Unique identifier for a copy within a catalog.
///
/// Identifiers are allocated sequentially by a catalog's `buy` operation and
/// are never reused, even after the copy is lost.
///
/// The identifier is catalog-scoped: two copies held by different catalogs may
/// carry the same `CopyId`. Catalogs verify handle identity with
/// [`BookCopy::same_copy`] before trusting an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CopyId(pub u64);

impl CopyId {
    /// Create a new copy ID
    pub fn new(id: u64) -> Self {
        CopyId(id)
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CopyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An edition of a book -- not the physical object, but the combination of
/// words that make up a book.
///
/// A book is uniquely identified by its title, author list, and publication
/// year. Alphabetic case and author order are significant, so a book written
/// by "Fred" is different from a book written by "FRED".
///
/// ## Design Notes
///
/// - Immutable after construction; equality and hashing cover all three fields
/// - `year` is unsigned, so the non-negativity invariant holds by construction
/// - The non-blank invariants on title and authors are checked with debug
///   assertions at construction time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Book {
    title: String,
    authors: Vec<String>,
    year: u32,
}

impl Book {
    /// Make a new book.
    ///
    /// `title` must contain at least one non-space character. `authors` must
    /// contain at least one name, and each name must contain at least one
    /// non-space character.
    ///
    /// # Example
    /// ```
    /// use folio_core::Book;
    /// let book = Book::new("The Dispossessed", vec!["Ursula K. Le Guin".into()], 1974);
    /// assert_eq!(book.year(), 1974);
    /// ```
    pub fn new(title: impl Into<String>, authors: Vec<String>, year: u32) -> Self {
        let book = Book {
            title: title.into(),
            authors,
            year,
        };
        book.check_rep();
        book
    }

    fn check_rep(&self) {
        debug_assert!(
            !self.title.trim().is_empty(),
            "book title must contain a non-space character"
        );
        debug_assert!(!self.authors.is_empty(), "book must have at least one author");
        for author in &self.authors {
            debug_assert!(
                !author.trim().is_empty(),
                "author name must contain a non-space character"
            );
        }
    }

    /// The title of this book
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The authors of this book, in cover order
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// The year this edition was published (Common Era)
    pub fn year(&self) -> u32 {
        self.year
    }

    /// The combined title-and-authors text that fuzzy search scores against.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + 16);
        text.push_str(&self.title);
        for author in &self.authors {
            text.push(' ');
            text.push_str(author);
        }
        text
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} ({})", self.title, self.authors.join(", "), self.year)
    }
}

/// The physical condition of a book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// The copy is in circulation-worthy shape
    Good,

    /// The copy has been damaged
    Damaged,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Good => write!(f, "good"),
            Condition::Damaged => write!(f, "damaged"),
        }
    }
}

/// A handle onto one physical copy of a book held in a catalog.
///
/// Copies are created only by a catalog's `buy` operation, always in
/// [`Condition::Good`]. Cloning a handle is cheap and yields another handle
/// onto the *same* physical copy: the condition cell is shared, so
/// [`set_condition`](BookCopy::set_condition) through any clone is visible
/// through all of them.
///
/// ## Identity
///
/// Two copies are never interchangeable, even of the same book. Equality and
/// hashing use the copy id; [`same_copy`](BookCopy::same_copy) checks true
/// object identity and is what catalogs use to reject handles minted by a
/// different catalog instance.
#[derive(Debug, Clone)]
pub struct BookCopy {
    id: CopyId,
    book: Arc<Book>,
    condition: Arc<RwLock<Condition>>,
}

impl BookCopy {
    /// Create a new copy handle, initially in good condition.
    ///
    /// Only catalogs mint copies; external code obtains handles from `buy`
    /// and the query operations.
    pub(crate) fn new(id: CopyId, book: Arc<Book>) -> Self {
        BookCopy {
            id,
            book,
            condition: Arc::new(RwLock::new(Condition::Good)),
        }
    }

    /// The catalog-scoped identifier of this copy
    pub fn id(&self) -> CopyId {
        self.id
    }

    /// The book of which this is a copy
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// The shared book reference, for index keys
    pub(crate) fn book_arc(&self) -> &Arc<Book> {
        &self.book
    }

    /// The current condition of this copy
    pub fn condition(&self) -> Condition {
        *self.condition.read()
    }

    /// Record the condition of this copy, typically after a returned copy has
    /// been inspected.
    pub fn set_condition(&self, condition: Condition) {
        *self.condition.write() = condition;
    }

    /// Check whether `other` is a handle onto the same physical copy.
    ///
    /// Stricter than `==`: ids are only unique within one catalog, while the
    /// condition cell is unique per minted copy.
    pub fn same_copy(&self, other: &BookCopy) -> bool {
        Arc::ptr_eq(&self.condition, &other.condition)
    }
}

impl PartialEq for BookCopy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BookCopy {}

impl Hash for BookCopy {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for BookCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "copy {} of {} [{}]", self.id, self.book, self.condition())
    }
}

/// Statistics about a catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Total number of live copies (available + checked out)
    pub total_copies: u64,

    /// Number of copies currently available
    pub available_copies: u64,

    /// Number of copies currently checked out
    pub checked_out_copies: u64,

    /// Number of distinct books with at least one live copy
    pub distinct_books: u64,

    /// When the catalog was last mutated
    pub last_updated: Option<DateTime<Utc>>,
}

impl CatalogStats {
    /// Create new empty stats
    pub fn new() -> Self {
        CatalogStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn le_guin() -> Book {
        Book::new("The Dispossessed", vec!["Ursula K. Le Guin".to_string()], 1974)
    }

    #[test]
    fn test_book_equality_covers_all_fields() {
        let a = Book::new("Normal Book", vec!["Normal Author".to_string()], 1992);
        let b = Book::new("Normal Book", vec!["Normal Author".to_string()], 1992);
        assert_eq!(a, b);

        let different_year = Book::new("Normal Book", vec!["Normal Author".to_string()], 1995);
        assert_ne!(a, different_year);

        // Case is significant
        let different_case = Book::new("Normal Book", vec!["normal author".to_string()], 1992);
        assert_ne!(a, different_case);
    }

    #[test]
    fn test_book_author_order_significant() {
        let ab = Book::new(
            "Good Omens",
            vec!["Terry Pratchett".to_string(), "Neil Gaiman".to_string()],
            1990,
        );
        let ba = Book::new(
            "Good Omens",
            vec!["Neil Gaiman".to_string(), "Terry Pratchett".to_string()],
            1990,
        );
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_book_hash_consistent_with_equality() {
        let mut set = HashSet::new();
        set.insert(Book::new("Normal Book", vec!["Normal Author".to_string()], 1992));
        assert!(set.contains(&Book::new("Normal Book", vec!["Normal Author".to_string()], 1992)));
        assert!(!set.contains(&Book::new("Normal Book", vec!["Normal Author".to_string()], 1995)));
    }

    #[test]
    fn test_book_search_text() {
        let book = Book::new(
            "Good Omens",
            vec!["Terry Pratchett".to_string(), "Neil Gaiman".to_string()],
            1990,
        );
        assert_eq!(book.search_text(), "Good Omens Terry Pratchett Neil Gaiman");
    }

    #[test]
    fn test_book_display() {
        assert_eq!(
            le_guin().to_string(),
            "The Dispossessed by Ursula K. Le Guin (1974)"
        );
    }

    #[test]
    #[should_panic]
    fn test_blank_title_rejected() {
        let _ = Book::new("   ", vec!["Someone".to_string()], 2000);
    }

    #[test]
    #[should_panic]
    fn test_empty_author_list_rejected() {
        let _ = Book::new("Title", Vec::new(), 2000);
    }

    #[test]
    fn test_copies_of_same_book_are_distinct() {
        let book = Arc::new(le_guin());
        let first = BookCopy::new(CopyId::new(1), Arc::clone(&book));
        let second = BookCopy::new(CopyId::new(2), Arc::clone(&book));
        assert_ne!(first, second);
        assert!(!first.same_copy(&second));
        assert_eq!(first.book(), second.book());
    }

    #[test]
    fn test_copy_clone_shares_condition() {
        let copy = BookCopy::new(CopyId::new(7), Arc::new(le_guin()));
        let alias = copy.clone();
        assert_eq!(copy, alias);
        assert!(copy.same_copy(&alias));

        assert_eq!(copy.condition(), Condition::Good);
        alias.set_condition(Condition::Damaged);
        assert_eq!(copy.condition(), Condition::Damaged);
    }

    #[test]
    fn test_copy_equality_by_id_only() {
        let first = BookCopy::new(CopyId::new(1), Arc::new(le_guin()));
        let forged = BookCopy::new(
            CopyId::new(1),
            Arc::new(Book::new("Other", vec!["Other".to_string()], 2001)),
        );
        // Same id compares equal, but identity tells them apart
        assert_eq!(first, forged);
        assert!(!first.same_copy(&forged));
    }

    #[test]
    fn test_copy_display() {
        let copy = BookCopy::new(CopyId::new(3), Arc::new(le_guin()));
        assert_eq!(
            copy.to_string(),
            "copy #3 of The Dispossessed by Ursula K. Le Guin (1974) [good]"
        );
    }
}
