//! Reconciliation of scraped records into the catalog
//!
//! A scraped batch names its categories by string. Reconciliation resolves
//! each name to a category row, creating the missing ones, and inserts one
//! book per record. The whole batch lands in a single transaction.

mod engine;

pub use engine::reconcile;

use crate::storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Step of reconciliation a storage failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStage {
    Begin,
    Lookup,
    CreateCategory,
    CreateBooks,
    Commit,
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Begin => "begin",
            Self::Lookup => "lookup",
            Self::CreateCategory => "create category",
            Self::CreateBooks => "create books",
            Self::Commit => "commit",
        };
        f.write_str(stage)
    }
}

/// Why a batch could not be reconciled
///
/// Whenever this is returned the catalog is unchanged.
#[derive(Debug, Error)]
pub enum ReconcileFailure {
    #[error("storage failure during {stage}: {source}")]
    Storage {
        stage: ReconcileStage,
        #[source]
        source: StorageError,
    },

    #[error("no category id resolved for '{name}'")]
    UnresolvedCategory { name: String },
}

impl ReconcileFailure {
    pub(crate) fn at(stage: ReconcileStage) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::Storage { stage, source }
    }
}

/// Rows created by one committed reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub categories_created: usize,
    pub books_created: usize,
}
