//! Loading book collections from JSON manifests.
//!
//! A manifest is a JSON array of entries, one per edition:
//!
//! ```json
//! [
//!   { "title": "The Dispossessed", "authors": ["Ursula K. Le Guin"], "year": 1974, "copies": 2 },
//!   { "title": "Good Omens", "authors": ["Terry Pratchett", "Neil Gaiman"], "year": 1990 }
//! ]
//! ```
//!
//! `copies` defaults to 1. Entries are validated before any book is
//! constructed, so a bad manifest is reported as an error rather than
//! tripping the catalog's invariants.

use anyhow::{bail, Context, Result};
use folio_core::{Book, Catalog};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One edition in a collection manifest.
#[derive(Debug, Deserialize)]
pub struct CollectionEntry {
    pub title: String,
    pub authors: Vec<String>,
    pub year: u32,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

fn default_copies() -> u32 {
    1
}

/// Load and validate a collection manifest.
pub fn load(path: &Path) -> Result<Vec<CollectionEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read collection manifest {}", path.display()))?;

    let entries: Vec<CollectionEntry> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse collection manifest {}", path.display()))?;

    for (i, entry) in entries.iter().enumerate() {
        validate(entry).with_context(|| format!("invalid entry {} in {}", i, path.display()))?;
    }

    debug!(entries = entries.len(), path = %path.display(), "Collection manifest loaded");
    Ok(entries)
}

fn validate(entry: &CollectionEntry) -> Result<()> {
    if entry.title.trim().is_empty() {
        bail!("title must contain a non-space character");
    }
    if entry.authors.is_empty() {
        bail!("at least one author is required");
    }
    for author in &entry.authors {
        if author.trim().is_empty() {
            bail!("author names must contain a non-space character");
        }
    }
    Ok(())
}

/// Stock a catalog with every copy listed in the manifest.
pub fn stock(catalog: &mut dyn Catalog, entries: &[CollectionEntry]) {
    for entry in entries {
        for _ in 0..entry.copies {
            catalog.buy(Book::new(&entry.title, entry.authors.clone(), entry.year));
        }
    }
}
