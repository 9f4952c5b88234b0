//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the QuestionStore trait.

use crate::model::{Question, Quota};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{QuestionStore, StorageError, StorageResult};
use crate::storage::{CrawlBatch, CrawlReceipt, RunRecord, StoredQuestion};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path` and ensures the schema exists
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl QuestionStore for SqliteStore {
    fn record_crawl(&mut self, batch: &CrawlBatch) -> StorageResult<CrawlReceipt> {
        let previous_count = self.count_questions()?;
        let crawl_date = batch.crawl_date.to_rfc3339();

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO crawl_runs (tag, crawled_at, config_hash, quota_max, quota_remaining, question_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                batch.tag,
                crawl_date,
                batch.config_hash,
                batch.quota.map(|q| q.max),
                batch.quota.map(|q| q.remaining),
                to_sql_int("question_count", batch.questions.len() as u64)?,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO questions (
                    crawl_id, crawl_date, question_id, title, tags, link, body_markdown,
                    score, view_count, is_answered, accepted_answer_id, answer_count,
                    creation_date, last_activity_date, last_edit_date, protected_date, closed_date
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;

            for question in &batch.questions {
                let tags = serde_json::to_string(&question.tags)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                let accepted_answer_id = question
                    .accepted_answer_id
                    .map(|id| to_sql_int("accepted_answer_id", id))
                    .transpose()?;

                stmt.execute(params![
                    run_id,
                    crawl_date,
                    to_sql_int("question_id", question.question_id)?,
                    question.title,
                    tags,
                    question.link,
                    question.body_markdown,
                    question.score,
                    to_sql_int("view_count", question.view_count)?,
                    question.is_answered,
                    accepted_answer_id,
                    question.answer_count,
                    question.creation_date.timestamp(),
                    question.last_activity_date.timestamp(),
                    question.last_edit_date.map(|d| d.timestamp()),
                    question.protected_date.map(|d| d.timestamp()),
                    question.closed_date.map(|d| d.timestamp()),
                ])?;
            }
        }

        tx.commit()?;

        let inserted = batch.questions.len() as u64;
        tracing::debug!(
            "Stored run {} with {} questions ({} previously stored)",
            run_id,
            inserted,
            previous_count
        );

        Ok(CrawlReceipt {
            run_id,
            previous_count,
            inserted,
            total: previous_count + inserted,
        })
    }

    fn count_questions(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        from_sql_int("count", count)
    }

    fn load_questions(&self) -> StorageResult<Vec<StoredQuestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT crawl_id, crawl_date, question_id, title, tags, link, body_markdown,
                    score, view_count, is_answered, accepted_answer_id, answer_count,
                    creation_date, last_activity_date, last_edit_date, protected_date, closed_date
             FROM questions ORDER BY row_id",
        )?;

        let rows = stmt
            .query_map([], QuestionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(QuestionRow::into_stored).collect()
    }

    fn list_runs(&self) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, tag, crawled_at, config_hash, quota_max, quota_remaining, question_count
             FROM crawl_runs ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<u32>>(4)?,
                    row.get::<_, Option<u32>>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, tag, crawled_at, config_hash, quota_max, quota_remaining, count)|
                 -> StorageResult<RunRecord> {
                    let quota = match (quota_max, quota_remaining) {
                        (Some(max), Some(remaining)) => Some(Quota { max, remaining }),
                        _ => None,
                    };
                    Ok(RunRecord {
                        id,
                        tag,
                        crawled_at: parse_rfc3339(&crawled_at)?,
                        config_hash,
                        quota,
                        question_count: from_sql_int("question_count", count)?,
                    })
                },
            )
            .collect()
    }
}

/// Raw column values of one `questions` row
struct QuestionRow {
    crawl_id: i64,
    crawl_date: String,
    question_id: i64,
    title: String,
    tags: String,
    link: String,
    body_markdown: String,
    score: i64,
    view_count: i64,
    is_answered: bool,
    accepted_answer_id: Option<i64>,
    answer_count: u32,
    creation_date: i64,
    last_activity_date: i64,
    last_edit_date: Option<i64>,
    protected_date: Option<i64>,
    closed_date: Option<i64>,
}

impl QuestionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            crawl_id: row.get(0)?,
            crawl_date: row.get(1)?,
            question_id: row.get(2)?,
            title: row.get(3)?,
            tags: row.get(4)?,
            link: row.get(5)?,
            body_markdown: row.get(6)?,
            score: row.get(7)?,
            view_count: row.get(8)?,
            is_answered: row.get(9)?,
            accepted_answer_id: row.get(10)?,
            answer_count: row.get(11)?,
            creation_date: row.get(12)?,
            last_activity_date: row.get(13)?,
            last_edit_date: row.get(14)?,
            protected_date: row.get(15)?,
            closed_date: row.get(16)?,
        })
    }

    fn into_stored(self) -> StorageResult<StoredQuestion> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let question = Question {
            question_id: from_sql_int("question_id", self.question_id)?,
            title: self.title,
            tags,
            link: self.link,
            body_markdown: self.body_markdown,
            score: self.score,
            view_count: from_sql_int("view_count", self.view_count)?,
            is_answered: self.is_answered,
            accepted_answer_id: self
                .accepted_answer_id
                .map(|id| from_sql_int("accepted_answer_id", id))
                .transpose()?,
            answer_count: self.answer_count,
            creation_date: from_epoch(self.creation_date)?,
            last_activity_date: from_epoch(self.last_activity_date)?,
            last_edit_date: self.last_edit_date.map(from_epoch).transpose()?,
            protected_date: self.protected_date.map(from_epoch).transpose()?,
            closed_date: self.closed_date.map(from_epoch).transpose()?,
        };

        Ok(StoredQuestion {
            crawl_id: self.crawl_id,
            crawl_date: parse_rfc3339(&self.crawl_date)?,
            question,
        })
    }
}

fn to_sql_int(field: &str, value: u64) -> StorageResult<i64> {
    i64::try_from(value)
        .map_err(|_| StorageError::Serialization(format!("{} out of range: {}", field, value)))
}

fn from_sql_int(field: &str, value: i64) -> StorageResult<u64> {
    u64::try_from(value)
        .map_err(|_| StorageError::Corrupt(format!("negative {}: {}", field, value)))
}

fn from_epoch(seconds: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| StorageError::Corrupt(format!("timestamp out of range: {}", seconds)))
}

fn parse_rfc3339(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp '{}': {}", value, e)))
}
