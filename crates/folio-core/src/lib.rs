//! # Folio Core Library
//!
//! This crate provides the catalog and fuzzy-search functionality for the
//! Folio book catalog tool. The catalog is a purely in-memory structure: it
//! owns every physical copy it has bought, partitions them into available and
//! checked-out, and answers per-book lookups and ranked fuzzy queries.
//!
//! ## Architecture
//!
//! - **Types** (`types`): books, copy handles, conditions, statistics
//! - **Catalog** (`catalog`): the `Catalog` trait and its two implementations
//! - **Search** (`search`): query folding, substring scoring, match caching
//! - **Config** (`config`): configuration management
//! - **Errors** (`error`): library error types
//!
//! ## Example
//!
//! ```rust
//! use folio_core::{Book, Catalog, IndexedCatalog};
//!
//! let mut catalog = IndexedCatalog::new();
//! let book = Book::new("The Left Hand of Darkness", vec!["Ursula K. Le Guin".into()], 1969);
//! let copy = catalog.buy(book.clone());
//!
//! catalog.checkout(&copy).unwrap();
//! assert!(!catalog.is_available(&copy));
//!
//! for found in catalog.find("left hand") {
//!     println!("{}", found);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use catalog::{make_catalog, Catalog, IndexedCatalog, LinearCatalog};
pub use config::{Config, Engine};
pub use error::{FolioError, Result};
pub use search::FuzzyQuery;
pub use types::{Book, BookCopy, CatalogStats, Condition, CopyId};
