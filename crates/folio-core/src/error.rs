//! Error types for Folio core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while higher-level code can use `anyhow` for
//! convenient error handling.

use crate::types::{BookCopy, CopyId};
use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Core error types for Folio operations.
///
/// The misuse variants report contract violations by the caller: the catalog
/// refuses the operation and leaves its state untouched, rather than silently
/// accepting a transition that would corrupt the availability partition.
#[derive(Error, Debug)]
pub enum FolioError {
    // === Catalog Misuse Errors ===
    /// Checkout of a copy that is not currently available
    #[error("copy {copy} of {book} is not available for checkout")]
    NotAvailable { copy: CopyId, book: String },

    /// Checkin of a copy that is not currently checked out
    #[error("copy {copy} of {book} is not checked out")]
    NotCheckedOut { copy: CopyId, book: String },

    /// Operation on a copy this catalog does not hold (lost, never bought
    /// here, or a handle minted by a different catalog)
    #[error("copy {copy} of {book} is not held by this catalog")]
    UnknownCopy { copy: CopyId, book: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    Config { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FolioError {
    /// Returns true if this error reports a caller contract violation
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            FolioError::NotAvailable { .. }
                | FolioError::NotCheckedOut { .. }
                | FolioError::UnknownCopy { .. }
        )
    }

    pub(crate) fn not_available(copy: &BookCopy) -> Self {
        FolioError::NotAvailable {
            copy: copy.id(),
            book: copy.book().to_string(),
        }
    }

    pub(crate) fn not_checked_out(copy: &BookCopy) -> Self {
        FolioError::NotCheckedOut {
            copy: copy.id(),
            book: copy.book().to_string(),
        }
    }

    pub(crate) fn unknown_copy(copy: &BookCopy) -> Self {
        FolioError::UnknownCopy {
            copy: copy.id(),
            book: copy.book().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_misuse() {
        let err = FolioError::NotAvailable {
            copy: CopyId::new(1),
            book: "Normal Book".to_string(),
        };
        assert!(err.is_misuse());

        let err = FolioError::Config {
            reason: "bad toml".to_string(),
        };
        assert!(!err.is_misuse());
    }

    #[test]
    fn test_display_names_copy_and_book() {
        let err = FolioError::NotCheckedOut {
            copy: CopyId::new(42),
            book: "Normal Book by Normal Author (1992)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "copy #42 of Normal Book by Normal Author (1992) is not checked out"
        );
    }
}
