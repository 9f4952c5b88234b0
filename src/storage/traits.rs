//! Storage traits and error types

use crate::storage::{CrawlBatch, CrawlReceipt, RunRecord, StoredQuestion};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home for harvested questions
///
/// Appends are all-or-nothing: either the whole batch and its run record are
/// stored, or nothing is.
pub trait QuestionStore {
    /// Appends a batch after everything already stored
    fn record_crawl(&mut self, batch: &CrawlBatch) -> StorageResult<CrawlReceipt>;

    /// Counts stored questions across all runs
    fn count_questions(&self) -> StorageResult<u64>;

    /// Loads every stored question, oldest run first, server order within a run
    fn load_questions(&self) -> StorageResult<Vec<StoredQuestion>>;

    /// Lists crawl runs, oldest first
    fn list_runs(&self) -> StorageResult<Vec<RunRecord>>;
}
