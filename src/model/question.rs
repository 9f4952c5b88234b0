use chrono::serde::{ts_seconds, ts_seconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single question as returned by the `/questions` endpoint
///
/// Field names follow the endpoint's native snake_case schema. Timestamps are
/// epoch seconds on the wire and are converted to UTC timestamps on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: u64,

    pub title: String,
    pub tags: Vec<String>,
    pub link: String,
    pub body_markdown: String,

    pub score: i64,
    pub view_count: u64,

    pub is_answered: bool,
    #[serde(default)]
    pub accepted_answer_id: Option<u64>,
    pub answer_count: u32,

    #[serde(with = "ts_seconds")]
    pub creation_date: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    pub last_activity_date: DateTime<Utc>,
    #[serde(default, with = "ts_seconds_option")]
    pub last_edit_date: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_seconds_option")]
    pub protected_date: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_seconds_option")]
    pub closed_date: Option<DateTime<Utc>>,
}
