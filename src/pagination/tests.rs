//! Tests for pagination module

use super::*;
use crate::auth::{CredentialSet, SessionBuilder};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::{Pause, RecordingSleeper};
use crate::normalize::ResultSet;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

fn tweet(id: &str) -> Value {
    json!({
        "__typename": "Tweet",
        "rest_id": id,
        "core": {"user_results": {"result": {"core": {"name": "Ferris", "screen_name": "ferris"}}}},
        "legacy": {
            "id_str": id,
            "full_text": format!("post {id}"),
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "favorite_count": 1
        }
    })
}

fn tweet_entry(id: &str) -> Value {
    json!({
        "entryId": format!("tweet-{id}"),
        "sortIndex": id,
        "content": {
            "entryType": "TimelineTimelineItem",
            "itemContent": {
                "itemType": "TimelineTweet",
                "tweet_results": {"result": tweet(id)}
            }
        }
    })
}

fn cursor_entry(position: &str, value: &str) -> Value {
    json!({
        "entryId": format!("cursor-{position}-{value}"),
        "content": {
            "entryType": "TimelineTimelineCursor",
            "value": value,
            "cursorType": if position == "bottom" { "Bottom" } else { "Top" }
        }
    })
}

fn page_body(entries: Vec<Value>) -> Value {
    json!({
        "data": {
            "bookmark_timeline_v2": {
                "timeline": {
                    "instructions": [
                        {"type": "TimelineClearCache"},
                        {"type": "TimelineAddEntries", "entries": entries}
                    ]
                }
            }
        }
    })
}

/// Matches on the `cursor` inside the `variables` query parameter
struct CursorIs(Option<&'static str>);

impl Match for CursorIs {
    fn matches(&self, request: &Request) -> bool {
        let variables = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "variables")
            .and_then(|(_, v)| serde_json::from_str::<Value>(&v).ok());

        let cursor = variables
            .as_ref()
            .and_then(|v| v.get("cursor"))
            .and_then(Value::as_str);
        cursor == self.0
    }
}

fn engine_for(config: ClientConfig) -> (PaginationEngine, RecordingSleeper) {
    let creds = CredentialSet::from_pairs([("auth_token", "abc")]);
    let session = SessionBuilder::new(&config).build(&creds).unwrap();
    let sleeper = RecordingSleeper::new();
    let engine = PaginationEngine::new(session, &config)
        .unwrap()
        .with_sleeper(sleeper.clone());
    (engine, sleeper)
}

fn default_engine(server: &MockServer) -> (PaginationEngine, RecordingSleeper) {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    engine_for(config)
}

// ============================================================================
// Timeline Parsing Tests
// ============================================================================

#[test]
fn test_parse_page_items_and_cursor() {
    let body = page_body(vec![
        cursor_entry("top", "t0"),
        tweet_entry("1"),
        tweet_entry("2"),
        cursor_entry("bottom", "c1"),
    ]);

    let page = parse_page(&body).unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0]["rest_id"], "1");
    assert_eq!(page.items[1]["rest_id"], "2");
    assert_eq!(page.bottom_cursor.as_deref(), Some("c1"));
}

#[test]
fn test_parse_page_ignores_other_instruction_types() {
    let body = json!({
        "data": {"bookmark_timeline_v2": {"timeline": {"instructions": [
            {"type": "TimelinePinEntry", "entries": [tweet_entry("9")]},
            {"type": "TimelineAddEntries", "entries": [tweet_entry("1")]}
        ]}}}
    });

    let page = parse_page(&body).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0]["rest_id"], "1");
}

#[test]
fn test_parse_page_missing_path_is_malformed() {
    let err = parse_page(&json!({"data": {}})).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));

    let err = parse_page(&json!({"errors": [{"message": "Query not found"}]})).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));

    let body = json!({"data": {"bookmark_timeline_v2": {"timeline": {"instructions": {}}}}});
    assert!(matches!(
        parse_page(&body),
        Err(Error::MalformedResponse { .. })
    ));
}

#[test]
fn test_parse_page_empty_instructions() {
    let body = json!({"data": {"bookmark_timeline_v2": {"timeline": {"instructions": []}}}});
    let page = parse_page(&body).unwrap();
    assert!(page.items.is_empty());
    assert!(page.bottom_cursor.is_none());
}

#[test]
fn test_classify_entry() {
    assert_eq!(
        classify_entry(&cursor_entry("bottom", "c1")),
        TimelineEntry::BottomCursor("c1".to_string())
    );
    assert_eq!(
        classify_entry(&cursor_entry("top", "t1")),
        TimelineEntry::OtherCursor
    );

    // A bottom marker without the cursor entry type is not followed
    let odd = json!({"entryId": "cursor-bottom-1", "content": {"value": "c9"}});
    assert_eq!(classify_entry(&odd), TimelineEntry::OtherCursor);

    let no_payload = json!({
        "entryId": "tweet-1",
        "content": {"itemContent": {"tweet_results": {}}}
    });
    assert_eq!(classify_entry(&no_payload), TimelineEntry::Empty);

    let empty_result = json!({
        "entryId": "tweet-1",
        "content": {"itemContent": {"tweet_results": {"result": {}}}}
    });
    assert_eq!(classify_entry(&empty_result), TimelineEntry::Empty);

    assert!(matches!(
        classify_entry(&tweet_entry("5")),
        TimelineEntry::Item(_)
    ));
}

// ============================================================================
// Engine Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_two_pages_then_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(CursorIs(None))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            tweet_entry("1"),
            tweet_entry("2"),
            cursor_entry("bottom", "c1"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(CursorIs(Some("c1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, sleeper) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert_eq!(report.stop_reason(), Some(StopReason::Exhausted));
    assert_eq!(results.len(), 2);
    assert_eq!(report.records, 2);
    assert_eq!(report.pages, 2);
    assert_eq!(report.backoffs, 0);
    assert_eq!(results[0].id, "1");
    assert_eq!(results[1].id, "2");
    assert_eq!(
        sleeper.calls(),
        vec![(Pause::Politeness, Duration::from_secs(1))]
    );
}

#[tokio::test]
async fn test_401_fails_with_no_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert!(matches!(report.outcome, Outcome::Failed(Error::Auth { .. })));
    assert!(results.is_empty());
    assert_eq!(report.pages, 0);
}

#[tokio::test]
async fn test_429_then_200_retries_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(CursorIs(None))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(CursorIs(None))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![tweet_entry("1")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (engine, sleeper) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert_eq!(report.stop_reason(), Some(StopReason::Exhausted));
    assert_eq!(results.len(), 1);
    assert_eq!(report.backoffs, 1);
    assert_eq!(
        sleeper.calls(),
        vec![(Pause::RateLimit, Duration::from_secs(60))]
    );
}

#[tokio::test]
async fn test_longer_retry_after_extends_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "90"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
        .mount(&server)
        .await;

    let (engine, sleeper) = default_engine(&server);
    let report = engine.run(&mut ResultSet::new()).await;

    assert!(report.is_success());
    assert_eq!(
        sleeper.calls(),
        vec![(Pause::RateLimit, Duration::from_secs(90))]
    );
}

#[tokio::test]
async fn test_short_retry_after_keeps_fixed_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![tweet_entry("1")])))
        .mount(&server)
        .await;

    let (engine, sleeper) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert!(report.is_success());
    assert_eq!(report.backoffs, 3);
    assert_eq!(results.len(), 1);
    assert_eq!(
        sleeper.calls(),
        vec![(Pause::RateLimit, Duration::from_secs(60)); 3]
    );
}

#[tokio::test]
async fn test_retry_after_ignored_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "90"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .honor_retry_after(false)
        .build()
        .unwrap();
    let (engine, sleeper) = engine_for(config);
    engine.run(&mut ResultSet::new()).await;

    assert_eq!(
        sleeper.calls(),
        vec![(Pause::RateLimit, Duration::from_secs(60))]
    );
}

#[tokio::test]
async fn test_rate_limit_retry_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .max_rate_limit_retries(2)
        .build()
        .unwrap();
    let (engine, sleeper) = engine_for(config);
    let report = engine.run(&mut ResultSet::new()).await;

    assert!(matches!(
        report.outcome,
        Outcome::Failed(Error::RateLimited { .. })
    ));
    assert_eq!(report.backoffs, 2);
    assert_eq!(sleeper.count(Pause::RateLimit), 2);
}

#[tokio::test]
async fn test_missing_bottom_cursor_stops_after_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            cursor_entry("top", "t0"),
            tweet_entry("1"),
            tweet_entry("2"),
            tweet_entry("3"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, sleeper) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert_eq!(report.stop_reason(), Some(StopReason::Exhausted));
    assert_eq!(results.len(), 3);
    assert_eq!(report.pages, 1);
    assert!(sleeper.calls().is_empty());
}

#[tokio::test]
async fn test_page_without_items_stops_even_with_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(vec![cursor_entry("bottom", "c-forever")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert_eq!(report.stop_reason(), Some(StopReason::Exhausted));
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_max_pages_reached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            tweet_entry("1"),
            cursor_entry("bottom", "again"),
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .max_pages(2)
        .build()
        .unwrap();
    let (engine, sleeper) = engine_for(config);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert_eq!(report.stop_reason(), Some(StopReason::MaxPagesReached));
    assert_eq!(report.pages, 2);
    // No dedup: the same post on two pages is kept twice
    assert_eq!(results.len(), 2);
    assert_eq!(sleeper.count(Pause::Politeness), 1);
}

#[tokio::test]
async fn test_malformed_second_page_keeps_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(CursorIs(None))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            tweet_entry("1"),
            cursor_entry("bottom", "c1"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(CursorIs(Some("c1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert!(matches!(
        report.outcome,
        Outcome::Failed(Error::MalformedResponse { .. })
    ));
    assert_eq!(results.len(), 1);
    assert_eq!(report.pages, 1);
}

#[tokio::test]
async fn test_http_error_second_page_keeps_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(CursorIs(None))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            tweet_entry("1"),
            tweet_entry("2"),
            cursor_entry("bottom", "c1"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(CursorIs(Some("c1")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    match report.error() {
        Some(Error::HttpStatus { status, body }) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
    assert_eq!(results.len(), 2);
}

fn tombstone_entry(id: &str) -> Value {
    json!({
        "entryId": format!("tweet-{id}"),
        "content": {"itemContent": {"tweet_results": {"result": {"__typename": "TweetTombstone"}}}}
    })
}

#[tokio::test]
async fn test_unreadable_items_are_dropped() {
    let server = MockServer::start().await;

    let garbage = json!({
        "entryId": "tweet-4",
        "content": {"itemContent": {"tweet_results": {"result": "not an object"}}}
    });

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            tweet_entry("1"),
            tombstone_entry("2"),
            tweet_entry("3"),
            garbage,
        ])))
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert!(report.is_success());
    assert_eq!(report.dropped, 1);
    assert_eq!(report.unavailable, 1);
    let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_page_of_only_tombstones_keeps_paginating() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(CursorIs(None))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            tombstone_entry("1"),
            tombstone_entry("2"),
            cursor_entry("bottom", "c1"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(CursorIs(Some("c1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![tweet_entry("3")])))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = ResultSet::new();
    let report = engine.run(&mut results).await;

    assert_eq!(report.stop_reason(), Some(StopReason::Exhausted));
    assert_eq!(report.pages, 2);
    assert_eq!(report.unavailable, 2);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "3");
}

#[tokio::test]
async fn test_existing_results_are_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![tweet_entry("1")])),
        )
        .mount(&server)
        .await;

    let (engine, _) = default_engine(&server);
    let mut results = vec![crate::normalize::NormalizedRecord {
        id: "0".to_string(),
        ..Default::default()
    }];
    let report = engine.run(&mut results).await;

    assert_eq!(report.records, 1);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "0");
}

#[tokio::test]
async fn test_connection_error_fails() {
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let creds = CredentialSet::from_pairs([("auth_token", "abc")]);
    let session = SessionBuilder::new(&config).build(&creds).unwrap();
    let engine = PaginationEngine::new(session, &config)
        .unwrap()
        .with_sleeper(RecordingSleeper::new());

    let report = engine.run(&mut ResultSet::new()).await;
    assert!(matches!(report.outcome, Outcome::Failed(Error::Connection(_))));
}
