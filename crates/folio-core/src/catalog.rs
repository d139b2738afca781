//! In-memory catalogs of book copies.
//!
//! A catalog owns every copy it has bought and tracks which of them are
//! available on the shelves and which are checked out. It supports:
//!
//! - Acquiring new copies (`buy`) and retiring them permanently (`lose`)
//! - Moving copies between the available and checked-out partitions
//! - Per-book lookups that cost time proportional to that book's copies
//! - Ranked fuzzy search over every distinct book
//!
//! ## Architecture
//!
//! Two implementations of the one [`Catalog`] trait, selected by the host via
//! [`make_catalog`]:
//!
//! - [`IndexedCatalog`] keeps an id-to-copy map, two id sets for the
//!   availability partition, and a per-book shelf index with the book's folded
//!   search text precomputed. Everything except `find` is sub-linear in the
//!   total copy count; `find` is linear in distinct books, which is the
//!   contract.
//! - [`LinearCatalog`] keeps just the two partition sets and scans them. Fine
//!   for a shelf of dozens, kept as the simple reference implementation.
//!
//! Both maintain the same invariants: the partitions are disjoint, every live
//! copy is in exactly one of them, and the shelf index mirrors exactly the
//! live copies. Debug builds re-check the full invariant set after every
//! mutation.

use crate::config::Engine;
use crate::error::{FolioError, Result};
use crate::search::{fold, rank, FuzzyQuery, MatchCache};
use crate::types::{Book, BookCopy, CatalogStats, CopyId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A collection of book copies partitioned into available and checked-out.
///
/// The catalog is the sole owner of its copies' lifecycle: copies come into
/// existence through [`buy`](Catalog::buy) and leave it through
/// [`lose`](Catalog::lose). The state-changing operations fail fast with a
/// [`FolioError`] when a copy is not in the required state, leaving the
/// catalog unchanged; query operations never fail and return freshly built
/// containers that the caller may mutate freely.
///
/// Catalogs are single-threaded values. Embedders that share one across
/// threads must add their own mutual exclusion around every operation.
pub trait Catalog {
    /// Buy a new copy of `book`, in good condition and immediately available.
    ///
    /// Unknown books are registered automatically. Never fails.
    fn buy(&mut self, book: Book) -> BookCopy;

    /// Check out an available copy.
    ///
    /// Fails with [`FolioError::NotAvailable`] if the copy is currently
    /// checked out, and [`FolioError::UnknownCopy`] if this catalog does not
    /// hold it.
    fn checkout(&mut self, copy: &BookCopy) -> Result<()>;

    /// Return a checked-out copy to the shelves.
    ///
    /// Fails with [`FolioError::NotCheckedOut`] if the copy is currently
    /// available, and [`FolioError::UnknownCopy`] if this catalog does not
    /// hold it.
    fn checkin(&mut self, copy: &BookCopy) -> Result<()>;

    /// Retire a copy permanently, whichever partition it occupies.
    ///
    /// A lost copy is gone from every structure; no further operation on it is
    /// valid. Fails with [`FolioError::UnknownCopy`] if this catalog does not
    /// hold the copy (including when it was already lost).
    fn lose(&mut self, copy: &BookCopy) -> Result<()>;

    /// Whether `copy` is currently available in this catalog.
    ///
    /// False for checked-out, lost, and never-seen copies.
    fn is_available(&self, copy: &BookCopy) -> bool;

    /// All live copies of `book`, available or checked out.
    ///
    /// Empty for unknown books. The returned set is a snapshot; mutating it
    /// never affects the catalog.
    fn all_copies(&self, book: &Book) -> HashSet<BookCopy>;

    /// The currently available copies of `book`.
    ///
    /// Same snapshot guarantee as [`all_copies`](Catalog::all_copies).
    fn available_copies(&self, book: &Book) -> HashSet<BookCopy>;

    /// Find books fuzzily matching `query`, best match first.
    ///
    /// A book qualifies when the longest common substring between the folded
    /// query and its folded title-and-authors text is strictly longer than
    /// `query.len() - 3`. Results are ordered by match length descending, then
    /// publication year descending, then title ascending, with one entry per
    /// distinct book regardless of copy count. The returned list is a snapshot
    /// independent of later mutation.
    fn find(&self, query: &str) -> Vec<Book>;

    /// Number of live copies in the catalog.
    fn len(&self) -> usize;

    /// Whether the catalog holds no copies.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current catalog statistics.
    fn stats(&self) -> CatalogStats;
}

/// Construct the catalog implementation selected by `engine`.
pub fn make_catalog(engine: Engine) -> Box<dyn Catalog> {
    match engine {
        Engine::Indexed => Box::new(IndexedCatalog::new()),
        Engine::Linear => Box::new(LinearCatalog::new()),
    }
}

/// Per-book shelf state in the indexed catalog.
#[derive(Debug)]
struct Shelf {
    /// Folded title-and-authors text, scored by `find`
    folded: Vec<char>,

    /// Ids of the live copies of this book
    copies: HashSet<CopyId>,
}

impl Shelf {
    fn new(book: &Book) -> Self {
        Shelf {
            folded: fold(&book.search_text()),
            copies: HashSet::new(),
        }
    }
}

/// Catalog for large collections -- millions of copies.
///
/// Every operation except `find` runs sub-linearly in the total copy count;
/// per-book lookups cost time proportional to that one book's copies.
///
/// ## Example
///
/// ```rust
/// use folio_core::{Book, Catalog, IndexedCatalog};
///
/// let mut catalog = IndexedCatalog::new();
/// let copy = catalog.buy(Book::new("The Dispossessed", vec!["Ursula K. Le Guin".into()], 1974));
/// catalog.checkout(&copy).unwrap();
/// assert!(!catalog.is_available(&copy));
/// ```
pub struct IndexedCatalog {
    /// Every live copy, by id
    copies: HashMap<CopyId, BookCopy>,

    /// Ids of copies currently on the shelves
    available: HashSet<CopyId>,

    /// Ids of copies currently checked out
    checked_out: HashSet<CopyId>,

    /// Per-book shelf index; a book is present iff it has a live copy
    shelves: HashMap<Arc<Book>, Shelf>,

    /// Next copy id to allocate; ids are never reused
    next_id: u64,

    /// Match lengths retained across `find` calls with the same query
    cache: Mutex<MatchCache>,

    /// When the catalog was last mutated
    last_updated: Option<DateTime<Utc>>,
}

impl Default for IndexedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        IndexedCatalog {
            copies: HashMap::new(),
            available: HashSet::new(),
            checked_out: HashSet::new(),
            shelves: HashMap::new(),
            next_id: 1,
            cache: Mutex::new(MatchCache::new()),
            last_updated: None,
        }
    }

    /// Create a catalog with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        IndexedCatalog {
            copies: HashMap::with_capacity(capacity),
            available: HashSet::with_capacity(capacity),
            checked_out: HashSet::with_capacity(capacity),
            shelves: HashMap::new(),
            next_id: 1,
            cache: Mutex::new(MatchCache::new()),
            last_updated: None,
        }
    }

    /// Verify that `copy` is a live copy minted by this catalog.
    fn resolve(&self, copy: &BookCopy) -> Result<()> {
        match self.copies.get(&copy.id()) {
            Some(held) if held.same_copy(copy) => Ok(()),
            _ => Err(FolioError::unknown_copy(copy)),
        }
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    /// Assert the full rep invariant; compiled to a no-op in release builds.
    fn check_rep(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        assert!(
            self.available.is_disjoint(&self.checked_out),
            "available and checked-out must be disjoint"
        );
        assert_eq!(
            self.available.len() + self.checked_out.len(),
            self.copies.len(),
            "every live copy must be in exactly one partition"
        );

        let mut shelved = 0;
        for (book, shelf) in &self.shelves {
            assert!(!shelf.copies.is_empty(), "a shelf must hold at least one copy");
            for id in &shelf.copies {
                match self.copies.get(id) {
                    Some(held) => assert_eq!(held.book(), book.as_ref()),
                    None => panic!("shelved copy {id} is not live"),
                }
            }
            shelved += shelf.copies.len();
        }
        assert_eq!(shelved, self.copies.len(), "shelves must mirror the live copies");
    }
}

impl Catalog for IndexedCatalog {
    #[instrument(skip_all, fields(book = %book))]
    fn buy(&mut self, book: Book) -> BookCopy {
        // One shared allocation per distinct book
        let book = match self.shelves.get_key_value(&book) {
            Some((existing, _)) => Arc::clone(existing),
            None => Arc::new(book),
        };

        let id = CopyId::new(self.next_id);
        self.next_id += 1;

        let shelf = self
            .shelves
            .entry(Arc::clone(&book))
            .or_insert_with(|| Shelf::new(&book));
        shelf.copies.insert(id);

        let copy = BookCopy::new(id, book);
        self.copies.insert(id, copy.clone());
        self.available.insert(id);

        self.touch();
        self.check_rep();
        debug!(copy = %id, "copy acquired");
        copy
    }

    #[instrument(skip_all, fields(copy = %copy.id()))]
    fn checkout(&mut self, copy: &BookCopy) -> Result<()> {
        self.resolve(copy)?;
        let id = copy.id();

        if !self.available.remove(&id) {
            return Err(FolioError::not_available(copy));
        }
        self.checked_out.insert(id);

        self.touch();
        self.check_rep();
        debug!("copy checked out");
        Ok(())
    }

    #[instrument(skip_all, fields(copy = %copy.id()))]
    fn checkin(&mut self, copy: &BookCopy) -> Result<()> {
        self.resolve(copy)?;
        let id = copy.id();

        if !self.checked_out.remove(&id) {
            return Err(FolioError::not_checked_out(copy));
        }
        self.available.insert(id);

        self.touch();
        self.check_rep();
        debug!("copy checked in");
        Ok(())
    }

    #[instrument(skip_all, fields(copy = %copy.id()))]
    fn lose(&mut self, copy: &BookCopy) -> Result<()> {
        self.resolve(copy)?;
        let id = copy.id();

        if !self.available.remove(&id) {
            self.checked_out.remove(&id);
        }

        let emptied = match self.shelves.get_mut(copy.book()) {
            Some(shelf) => {
                shelf.copies.remove(&id);
                shelf.copies.is_empty()
            }
            None => false,
        };
        if emptied {
            self.shelves.remove(copy.book());
        }

        self.copies.remove(&id);

        self.touch();
        self.check_rep();
        debug!(book = %copy.book(), "copy lost");
        Ok(())
    }

    fn is_available(&self, copy: &BookCopy) -> bool {
        match self.copies.get(&copy.id()) {
            Some(held) => held.same_copy(copy) && self.available.contains(&copy.id()),
            None => false,
        }
    }

    fn all_copies(&self, book: &Book) -> HashSet<BookCopy> {
        match self.shelves.get(book) {
            Some(shelf) => shelf
                .copies
                .iter()
                .filter_map(|id| self.copies.get(id))
                .cloned()
                .collect(),
            None => HashSet::new(),
        }
    }

    fn available_copies(&self, book: &Book) -> HashSet<BookCopy> {
        match self.shelves.get(book) {
            Some(shelf) => shelf
                .copies
                .iter()
                .filter(|id| self.available.contains(id))
                .filter_map(|id| self.copies.get(id))
                .cloned()
                .collect(),
            None => HashSet::new(),
        }
    }

    fn find(&self, query: &str) -> Vec<Book> {
        let query = FuzzyQuery::new(query);
        let mut hits: Vec<(Arc<Book>, usize)> = Vec::new();

        {
            let mut cache = self.cache.lock();
            for (book, shelf) in &self.shelves {
                let len = cache.score(&query, book, &shelf.folded);
                if query.qualifies(len) {
                    hits.push((Arc::clone(book), len));
                }
            }
        }

        rank(&mut hits);
        hits.into_iter().map(|(book, _)| (*book).clone()).collect()
    }

    fn len(&self) -> usize {
        self.copies.len()
    }

    fn stats(&self) -> CatalogStats {
        CatalogStats {
            total_copies: self.copies.len() as u64,
            available_copies: self.available.len() as u64,
            checked_out_copies: self.checked_out.len() as u64,
            distinct_books: self.shelves.len() as u64,
            last_updated: self.last_updated,
        }
    }
}

impl std::fmt::Debug for IndexedCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedCatalog")
            .field("copies", &self.copies.len())
            .field("available", &self.available.len())
            .field("checked_out", &self.checked_out.len())
            .field("books", &self.shelves.len())
            .finish()
    }
}

/// Catalog for small collections, like a single person's home shelf.
///
/// Keeps only the two partition sets; per-book lookups and `find` scan them
/// linearly. Same contract as [`IndexedCatalog`], exercised by the same
/// behavioral suite.
#[derive(Debug)]
pub struct LinearCatalog {
    available: HashSet<BookCopy>,
    checked_out: HashSet<BookCopy>,
    next_id: u64,
    last_updated: Option<DateTime<Utc>>,
}

/// Whether `set` holds this exact copy, not just an id-equal one.
fn holds(set: &HashSet<BookCopy>, copy: &BookCopy) -> bool {
    set.get(copy).map_or(false, |held| held.same_copy(copy))
}

impl Default for LinearCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        LinearCatalog {
            available: HashSet::new(),
            checked_out: HashSet::new(),
            next_id: 1,
            last_updated: None,
        }
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    fn check_rep(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for copy in &self.available {
            assert!(
                !self.checked_out.contains(copy),
                "available and checked-out must be disjoint"
            );
        }
    }
}

impl Catalog for LinearCatalog {
    fn buy(&mut self, book: Book) -> BookCopy {
        let id = CopyId::new(self.next_id);
        self.next_id += 1;

        let copy = BookCopy::new(id, Arc::new(book));
        self.available.insert(copy.clone());

        self.touch();
        self.check_rep();
        copy
    }

    fn checkout(&mut self, copy: &BookCopy) -> Result<()> {
        if !holds(&self.available, copy) {
            return Err(if holds(&self.checked_out, copy) {
                FolioError::not_available(copy)
            } else {
                FolioError::unknown_copy(copy)
            });
        }

        if let Some(held) = self.available.take(copy) {
            self.checked_out.insert(held);
        }

        self.touch();
        self.check_rep();
        Ok(())
    }

    fn checkin(&mut self, copy: &BookCopy) -> Result<()> {
        if !holds(&self.checked_out, copy) {
            return Err(if holds(&self.available, copy) {
                FolioError::not_checked_out(copy)
            } else {
                FolioError::unknown_copy(copy)
            });
        }

        if let Some(held) = self.checked_out.take(copy) {
            self.available.insert(held);
        }

        self.touch();
        self.check_rep();
        Ok(())
    }

    fn lose(&mut self, copy: &BookCopy) -> Result<()> {
        if holds(&self.available, copy) {
            self.available.remove(copy);
        } else if holds(&self.checked_out, copy) {
            self.checked_out.remove(copy);
        } else {
            return Err(FolioError::unknown_copy(copy));
        }

        self.touch();
        self.check_rep();
        Ok(())
    }

    fn is_available(&self, copy: &BookCopy) -> bool {
        holds(&self.available, copy)
    }

    fn all_copies(&self, book: &Book) -> HashSet<BookCopy> {
        self.available
            .iter()
            .chain(self.checked_out.iter())
            .filter(|held| held.book() == book)
            .cloned()
            .collect()
    }

    fn available_copies(&self, book: &Book) -> HashSet<BookCopy> {
        self.available
            .iter()
            .filter(|held| held.book() == book)
            .cloned()
            .collect()
    }

    fn find(&self, query: &str) -> Vec<Book> {
        let query = FuzzyQuery::new(query);

        let mut books: HashSet<Arc<Book>> = HashSet::new();
        for copy in self.available.iter().chain(self.checked_out.iter()) {
            books.insert(Arc::clone(copy.book_arc()));
        }

        let mut hits: Vec<(Arc<Book>, usize)> = books
            .into_iter()
            .filter_map(|book| {
                let len = query.match_len_folded(&fold(&book.search_text()));
                query.qualifies(len).then_some((book, len))
            })
            .collect();

        rank(&mut hits);
        hits.into_iter().map(|(book, _)| (*book).clone()).collect()
    }

    fn len(&self) -> usize {
        self.available.len() + self.checked_out.len()
    }

    fn stats(&self) -> CatalogStats {
        let mut books: HashSet<&Book> = HashSet::new();
        for copy in self.available.iter().chain(self.checked_out.iter()) {
            books.insert(copy.book());
        }

        CatalogStats {
            total_copies: self.len() as u64,
            available_copies: self.available.len() as u64,
            checked_out_copies: self.checked_out.len() as u64,
            distinct_books: books.len() as u64,
            last_updated: self.last_updated,
        }
    }
}
