//! Pager behavior against a mock question-listing endpoint

use crate::support::{harness, harness_for, page_json};
use std::time::Duration;
use tag_harvest::crawler::{Clock, FetchEvent, PageRequest};
use tag_harvest::HarvestError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn ids(questions: &[tag_harvest::Question]) -> Vec<u64> {
    questions.iter().map(|q| q.question_id).collect()
}

/// Matches requests that carry no `key` query parameter
struct NoApiKey;

impl wiremock::Match for NoApiKey {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(name, _)| name == "key")
    }
}

#[tokio::test]
async fn test_two_pages_without_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2.3/questions"))
        .and(query_param("site", "stackoverflow"))
        .and(query_param("tagged", "example-tag"))
        .and(query_param("pagesize", "2"))
        .and(query_param("filter", "!nNPvSNP4(R"))
        .and(query_param("page", "1"))
        .and(NoApiKey)
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[11, 12], true, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.3/questions"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[13], false, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = harness(&mock_server, 10);
    let harvest = h.pager.fetch_all("example-tag", 2).await.expect("Harvest failed");

    assert_eq!(ids(&harvest.questions), vec![11, 12, 13]);
    assert_eq!(harvest.pages, 2);
    assert!(h.sleeper.sleeps().is_empty());

    let requested: Vec<u32> = h
        .sink
        .events()
        .into_iter()
        .filter_map(|event| match event {
            FetchEvent::PageRequested { page } => Some(page),
            _ => None,
        })
        .collect();
    assert_eq!(requested, vec![1, 2]);
    assert!(!h
        .sink
        .events()
        .iter()
        .any(|event| matches!(event, FetchEvent::CooldownWaited { .. })));

    let quota = harvest.quota().expect("Quota should be recorded");
    assert_eq!(quota.max, 300);
    assert_eq!(quota.remaining, 299);
    assert!(harvest.state.cooldown.is_none());
}

#[tokio::test]
async fn test_concatenates_pages_in_order() {
    let mock_server = MockServer::start().await;
    let pages: Vec<Vec<u64>> = vec![vec![5, 3, 9], vec![1, 2, 8], vec![7, 4, 6], vec![10]];

    for (index, page_ids) in pages.iter().enumerate() {
        let has_more = index + 1 < pages.len();
        Mock::given(method("GET"))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page_json(page_ids, has_more, None)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut h = harness(&mock_server, 10);
    let harvest = h.pager.fetch_all("python-polars", 3).await.expect("Harvest failed");

    let expected: Vec<u64> = pages.iter().flatten().copied().collect();
    assert_eq!(harvest.questions.len(), 10);
    assert_eq!(ids(&harvest.questions), expected);
    assert_eq!(harvest.pages, 4);
}

#[tokio::test]
async fn test_backoff_delays_next_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], true, Some(5))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[2], true, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3], false, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = harness(&mock_server, 10);
    let harvest = h.pager.fetch_all("python-polars", 1).await.expect("Harvest failed");

    assert_eq!(ids(&harvest.questions), vec![1, 2, 3]);
    // Only page 1 asked for a cooldown; page 2 cleared it
    assert_eq!(h.sleeper.sleeps(), vec![Duration::from_secs(5)]);
    assert!(h.sink.events().contains(&FetchEvent::CooldownWaited {
        waited: Duration::from_secs(5)
    }));
}

#[tokio::test]
async fn test_backoff_counts_from_previous_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], true, Some(10))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[2], false, None)))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, 10);
    let first = PageRequest {
        tag: "python-polars",
        page: 1,
        page_size: 1,
    };
    let (_, state) = h
        .pager
        .fetch_page(&h.pager.state(), &first)
        .await
        .expect("Page 1 failed");
    let cooldown = state.cooldown.expect("Cooldown should be recorded");

    h.clock.advance(Duration::from_secs(7));

    let second = PageRequest { page: 2, ..first };
    let (page, next) = h
        .pager
        .fetch_page(&state, &second)
        .await
        .expect("Page 2 failed");

    assert_eq!(h.sleeper.sleeps(), vec![Duration::from_secs(3)]);
    assert!(next.cooldown.is_none());
    assert!(!page.has_more);
    let ready_at = cooldown.ready_at().expect("Cooldown end should be representable");
    assert!(h.clock.now() >= ready_at);
}

#[tokio::test]
async fn test_retries_with_exponential_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1, 2], false, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = harness(&mock_server, 10);
    let harvest = h.pager.fetch_all("python-polars", 100).await.expect("Harvest failed");

    assert_eq!(ids(&harvest.questions), vec![1, 2]);
    assert_eq!(
        h.sleeper.sleeps(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );

    let retries: Vec<(u32, Option<u16>)> = h
        .sink
        .events()
        .into_iter()
        .filter_map(|event| match event {
            FetchEvent::RetryScheduled {
                attempt, status, ..
            } => Some((attempt, status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        retries,
        vec![(1, Some(502)), (2, Some(502)), (3, Some(502))]
    );
}

#[tokio::test]
async fn test_exhausted_retries_discard_earlier_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1, 2], true, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut h = harness(&mock_server, 3);
    let result = h.pager.fetch_all("python-polars", 2).await;

    match result {
        Err(HarvestError::RetriesExhausted {
            page,
            attempts,
            status,
            body,
        }) => {
            assert_eq!(page, 2);
            assert_eq!(attempts, 3);
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }

    // No sleep after the final attempt
    assert_eq!(
        h.sleeper.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
    assert!(h.sink.events().contains(&FetchEvent::RetriesExhausted {
        page: 2,
        attempts: 3
    }));
    // Page 1 still updated the pager's state
    assert_eq!(h.pager.state().quota_remaining(), Some(298));
}

#[tokio::test]
async fn test_single_attempt_fails_without_sleeping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad parameter"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = harness(&mock_server, 1);
    let result = h.pager.fetch_all("python-polars", 100).await;

    assert!(matches!(
        result,
        Err(HarvestError::RetriesExhausted { status: 400, .. })
    ));
    assert!(h.sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": "nope"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = harness(&mock_server, 10);
    let result = h.pager.fetch_all("python-polars", 100).await;

    assert!(matches!(
        result,
        Err(HarvestError::MalformedPayload { page: 1, .. })
    ));
    assert!(h.sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_connection_errors_are_retried() {
    // Nothing listens on the discard port
    let mut h = harness_for("http://127.0.0.1:9", 3, None);
    let result = h.pager.fetch_all("python-polars", 100).await;

    assert!(matches!(result, Err(HarvestError::Http { page: 1, .. })));
    assert_eq!(
        h.sleeper.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_api_key_is_sent_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("key", "s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], false, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = harness_for(&mock_server.uri(), 1, Some("s3cr3t"));
    let harvest = h.pager.fetch_all("python-polars", 100).await.expect("Harvest failed");

    assert_eq!(harvest.questions.len(), 1);
}
