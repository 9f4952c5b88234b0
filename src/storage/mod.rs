//! Storage module for persisting harvested questions
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Recording one crawl run per successful harvest
//! - Appending questions after everything already stored

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{QuestionStore, StorageError, StorageResult};

use crate::model::{Question, Quota};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens (creating if needed) the store at `path`
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::open(path)
}

/// The output of one harvest, ready to be appended
#[derive(Debug, Clone)]
pub struct CrawlBatch {
    pub tag: String,

    /// When the harvest finished; stamped on every stored row
    pub crawl_date: DateTime<Utc>,

    pub config_hash: String,
    pub quota: Option<Quota>,
    pub questions: Vec<Question>,
}

/// What a successful append did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReceipt {
    pub run_id: i64,

    /// Questions already stored before this batch
    pub previous_count: u64,

    pub inserted: u64,

    /// Questions stored after this batch
    pub total: u64,
}

/// A question read back from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredQuestion {
    pub crawl_id: i64,
    pub crawl_date: DateTime<Utc>,
    pub question: Question,
}

/// Represents a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub tag: String,
    pub crawled_at: DateTime<Utc>,
    pub config_hash: String,
    pub quota: Option<Quota>,
    pub question_count: u64,
}
