//! Storage error taxonomy
//!
//! Every storage-facing call in the data layer hands its raw `rusqlite::Error`
//! to [`handle_sqlite_error`] before returning, so callers only ever see the
//! three classifications below.

use rusqlite::ffi;
use thiserror::Error;

/// Classified failure returned by the membership store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row the operation required does not exist
    #[error("object does not exist")]
    NotFound,

    /// A uniqueness constraint rejected the write
    #[error("object already exists ({context})")]
    Conflict {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other engine failure, labelled with the step that failed
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    /// Whether this is a `Conflict` error
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Label of the failing step, if the error carries one
    pub fn context(&self) -> Option<&'static str> {
        match self {
            StoreError::NotFound => None,
            StoreError::Conflict { context, .. } | StoreError::Storage { context, .. } => {
                Some(*context)
            }
        }
    }

    /// The underlying engine error, if any
    pub fn sqlite_error(&self) -> Option<&rusqlite::Error> {
        match self {
            StoreError::NotFound => None,
            StoreError::Conflict { source, .. } | StoreError::Storage { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Translate an engine error into a [`StoreError`]
///
/// `context` names the step that failed (e.g. "insert error") and is kept on
/// the returned error next to the original failure.
pub fn handle_sqlite_error(err: rusqlite::Error, context: &'static str) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::Conflict {
            context,
            source: err,
        };
    }

    match err {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        source => StoreError::Storage { context, source },
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
