//! Database schema definitions

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per successful harvest
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT NOT NULL,
    crawled_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    quota_max INTEGER,
    quota_remaining INTEGER,
    question_count INTEGER NOT NULL
);

-- Harvested questions, append-only; row_id preserves insertion order
CREATE TABLE IF NOT EXISTS questions (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    crawl_id INTEGER NOT NULL REFERENCES crawl_runs(id),
    crawl_date TEXT NOT NULL,
    question_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    tags TEXT NOT NULL,
    link TEXT NOT NULL,
    body_markdown TEXT NOT NULL,
    score INTEGER NOT NULL,
    view_count INTEGER NOT NULL,
    is_answered INTEGER NOT NULL,
    accepted_answer_id INTEGER,
    answer_count INTEGER NOT NULL,
    creation_date INTEGER NOT NULL,
    last_activity_date INTEGER NOT NULL,
    last_edit_date INTEGER,
    protected_date INTEGER,
    closed_date INTEGER
);

CREATE INDEX IF NOT EXISTS idx_questions_question_id ON questions(question_id);
CREATE INDEX IF NOT EXISTS idx_questions_crawl ON questions(crawl_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
