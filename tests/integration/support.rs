//! Shared fixtures: virtual time, payload builders, and pager wiring

use serde_json::{json, Value};
use std::time::Duration;
use tag_harvest::config::{ApiKey, UserAgentConfig};
use tag_harvest::crawler::testing::{ManualClock, RecordingSleeper};
use tag_harvest::crawler::{
    build_http_client, Fetcher, Pager, QuestionsEndpoint, RecordingSink, RetryPolicy,
};
use wiremock::MockServer;

pub type TestPager = Pager<ManualClock, RecordingSleeper, RecordingSink>;

/// A pager pointed at `server` plus handles on its clock, sleeper, and sink
pub struct Harness {
    pub pager: TestPager,
    pub clock: ManualClock,
    pub sleeper: RecordingSleeper,
    pub sink: RecordingSink,
}

pub fn endpoint(base_url: &str, key: Option<&str>) -> QuestionsEndpoint {
    QuestionsEndpoint {
        base_url: base_url.to_string(),
        api_version: "2.3".to_string(),
        site: "stackoverflow".to_string(),
        filter: "!nNPvSNP4(R".to_string(),
        key: key.map(ApiKey::new),
    }
}

pub fn harness_for(base_url: &str, max_attempts: u32, key: Option<&str>) -> Harness {
    let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5))
        .expect("Failed to build client");
    let fetcher = Fetcher::new(
        client,
        endpoint(base_url, key),
        RetryPolicy::new(max_attempts),
    )
    .expect("Failed to build fetcher");

    let clock = ManualClock::new();
    let sleeper = RecordingSleeper::new(clock.clone());
    let sink = RecordingSink::new();
    let pager = Pager::new(fetcher, clock.clone(), sleeper.clone(), sink.clone());

    Harness {
        pager,
        clock,
        sleeper,
        sink,
    }
}

pub fn harness(server: &MockServer, max_attempts: u32) -> Harness {
    harness_for(&server.uri(), max_attempts, None)
}

pub fn question_json(id: u64) -> Value {
    json!({
        "question_id": id,
        "title": format!("Question {}", id),
        "tags": ["python", "python-polars"],
        "link": format!("https://stackoverflow.com/questions/{}", id),
        "body_markdown": format!("Body of question {}", id),
        "score": 1,
        "view_count": 10 * id,
        "is_answered": false,
        "answer_count": 0,
        "creation_date": 1_690_000_000u64 + id,
        "last_activity_date": 1_690_100_000u64 + id
    })
}

pub fn page_json(ids: &[u64], has_more: bool, backoff: Option<u64>) -> Value {
    let items: Vec<Value> = ids.iter().copied().map(question_json).collect();
    let mut page = json!({
        "items": items,
        "has_more": has_more,
        "quota_max": 300,
        "quota_remaining": 300 - ids.len() as u64,
    });
    if let Some(seconds) = backoff {
        page["backoff"] = json!(seconds);
    }
    page
}
