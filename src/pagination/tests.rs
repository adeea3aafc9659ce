//! Tests for pagination module

use super::*;
use crate::auth::{Credentials, Signer};
use crate::error::Error;
use crate::http::{Transport, TransportConfig};
use crate::types::{ExceptionHandler, Record};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_transport() -> Transport {
    let signer = Signer::new(Arc::new(Credentials::new("ck", "cs", "at", "ats")));
    let config = TransportConfig::builder()
        .rate_limit_cooldown(Duration::from_millis(10))
        .unavailable_delay(Duration::from_millis(10))
        .build();
    Transport::with_config(signer, config).unwrap()
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

async fn query_values(server: &MockServer, name: &str) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| {
            req.url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

// ============================================================================
// URL Helper Tests
// ============================================================================

#[test_case("https://api.example.com/1.1/friends/ids.json" => '?' ; "json suffix")]
#[test_case("https://api.example.com/1.1/friends/ids.xml" => '?' ; "xml suffix")]
#[test_case("https://api.example.com/1.1/friends/ids." => '?' ; "dot suffix")]
#[test_case("https://api.example.com/1.1/friends/ids" => '?' ; "no query")]
#[test_case("https://api.example.com/1.1/friends/ids.json?screen_name=a" => '&' ; "existing query")]
fn test_query_delimiter(url: &str) -> char {
    query_delimiter(url)
}

#[test]
fn test_append_query_param() {
    assert_eq!(
        append_query_param("https://api.example.com/ids.json", "cursor", -1),
        "https://api.example.com/ids.json?cursor=-1"
    );
    assert_eq!(
        append_query_param("https://api.example.com/timeline.json?count=200", "max_id", 10),
        "https://api.example.com/timeline.json?count=200&max_id=10"
    );
}

#[test]
fn test_extract_id() {
    let r = record(json!({"id": 42, "id_str": "43", "name": "x", "big": 1.5}));
    assert_eq!(extract_id(&r, "id"), Some(42));
    assert_eq!(extract_id(&r, "id_str"), Some(43));
    assert_eq!(extract_id(&r, "name"), None);
    assert_eq!(extract_id(&r, "big"), None);
    assert_eq!(extract_id(&r, "missing"), None);
}

// ============================================================================
// State Tests
// ============================================================================

#[test]
fn test_cursor_position_from_record() {
    let page = record(json!({"previous_cursor": 0, "next_cursor": 1234, "ids": []}));
    let position = CursorPosition::from_record(&page).unwrap();
    assert_eq!(position, CursorPosition { previous: 0, next: 1234 });
    assert!(!position.is_stalled());
    assert!(!position.is_last());

    let missing = record(json!({"next_cursor": 0}));
    assert!(matches!(
        CursorPosition::from_record(&missing),
        Err(Error::Decode { .. })
    ));
}

#[test]
fn test_window_state_advance() {
    let mut state = WindowState::new();
    assert_eq!(state.max_id, None);

    state.begin_pass();
    for id in [50, 30, 10] {
        state.observe(Some(id));
    }
    assert!(state.advance());
    assert_eq!(state.max_id, Some(10));

    // Only the boundary record comes back: no progress
    state.begin_pass();
    state.observe(Some(10));
    assert!(!state.advance());
    assert_eq!(state.max_id, Some(10));

    state.begin_pass();
    assert!(!state.advance());
    assert_eq!(state.total_items, 4);
    assert_eq!(state.passes, 3);
}

#[test]
fn test_window_state_non_numeric_only() {
    let mut state = WindowState::new();
    state.begin_pass();
    state.observe(None);
    assert_eq!(state.items_received, 1);
    assert!(!state.advance());
}

// ============================================================================
// Batch Chunk Tests
// ============================================================================

#[test]
fn test_split_batches_ids_only() {
    let ids: Vec<i64> = (1..=150).collect();
    let chunks = split_batches(&ids, &[], 100).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].ids.len(), 100);
    assert_eq!(chunks[1].ids.len(), 50);
    assert_eq!(chunks[1].ids[0], 101);
}

#[test]
fn test_split_batches_interleaves() {
    let chunks = split_batches(&[1, 2, 3, 4], &names(&["a", "b", "c"]), 3).unwrap();

    assert_eq!(
        chunks,
        vec![
            BatchChunk {
                ids: vec![1, 2],
                names: names(&["a"]),
            },
            BatchChunk {
                ids: vec![3, 4],
                names: names(&["b"]),
            },
            BatchChunk {
                ids: vec![],
                names: names(&["c"]),
            },
        ]
    );
    assert!(chunks.iter().all(|c| c.len() <= 3));
}

#[test]
fn test_split_batches_drains_remainder() {
    let chunks = split_batches(&[1], &names(&["a", "b", "c"]), 100).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].ids, vec![1]);
    assert_eq!(chunks[0].names, names(&["a", "b", "c"]));
}

#[test_case(7, 3 => 3 ; "uneven")]
#[test_case(200, 100 => 2 ; "exact")]
#[test_case(1, 100 => 1 ; "single")]
fn test_split_batches_request_count(total: usize, cap: usize) -> usize {
    let ids: Vec<i64> = (0..total as i64 / 2).collect();
    let names: Vec<String> = (0..total - ids.len()).map(|i| format!("user{i}")).collect();
    split_batches(&ids, &names, cap).unwrap().len()
}

#[test]
fn test_split_batches_rejects_empty_input() {
    let err = split_batches(&[], &[], 100).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let err = split_batches(&[1], &[], 0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_split_batches_rejects_name_with_separator() {
    let err = split_batches(&[1, 2], &names(&["alice", "bob,carol"]), 100).unwrap_err();
    match err {
        Error::InvalidArgument { message } => assert!(message.contains("bob,carol")),
        other => panic!("expected invalid argument, got {other:?}"),
    }
}

#[test]
fn test_batch_chunk_apply() {
    let chunk = BatchChunk {
        ids: vec![12, 34],
        names: names(&["alice", "bob"]),
    };
    let url = chunk
        .apply("https://api.example.com/1.1/users/lookup.json")
        .unwrap();
    assert_eq!(
        url,
        "https://api.example.com/1.1/users/lookup.json?screen_name=alice%2Cbob&user_id=12%2C34"
    );

    let ids_only = BatchChunk {
        ids: vec![7],
        names: vec![],
    };
    assert_eq!(
        ids_only.apply("https://api.example.com/lookup.json").unwrap(),
        "https://api.example.com/lookup.json?user_id=7"
    );
}

// ============================================================================
// Cursor Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_cursor_stalled_first_page_issues_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/friends/ids.json"))
        .and(query_param("cursor", "-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ids": [1, 2], "previous_cursor": 0, "next_cursor": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut pages = 0;
    let mut on_page = |_: &Record, _: CursorPosition| {
        pages += 1;
        2
    };
    let position = CursorPaginator::new(&transport)
        .run(
            &format!("{}/1.1/friends/ids.json", server.uri()),
            None,
            Some(&mut on_page),
            None,
        )
        .await
        .unwrap();

    assert_eq!(position, CursorPosition { previous: 0, next: 0 });
    assert_eq!(pages, 1);
}

#[tokio::test]
async fn test_cursor_follows_next_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ids": [1], "previous_cursor": 0, "next_cursor": 111})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "111"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ids": [2], "previous_cursor": -111, "next_cursor": 222})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "222"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ids": [3], "previous_cursor": -222, "next_cursor": 0})),
        )
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut ids = Vec::new();
    let mut on_record = |page: &Record| ids.push(page["ids"][0].clone());
    let position = CursorPaginator::new(&transport)
        .run(
            &format!("{}/1.1/followers/ids.json", server.uri()),
            Some(&mut on_record),
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(position.next, 0);
    assert_eq!(
        query_values(&server, "cursor").await,
        vec![
            Some("-1".to_string()),
            Some("111".to_string()),
            Some("222".to_string())
        ]
    );
}

#[tokio::test]
async fn test_cursor_stops_at_item_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"previous_cursor": 1, "next_cursor": 2})),
        )
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut on_page = |_: &Record, _: CursorPosition| 20;
    CursorPaginator::new(&transport)
        .with_max_items(30)
        .run(&server.uri(), None, Some(&mut on_page), None)
        .await
        .unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cursor_start_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "555"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"previous_cursor": -555, "next_cursor": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport();
    let position = CursorPaginator::new(&transport)
        .with_start_cursor(555)
        .run(&format!("{}/ids.json", server.uri()), None, None, None)
        .await
        .unwrap();

    assert_eq!(position, CursorPosition { previous: -555, next: 0 });
}

#[tokio::test]
async fn test_cursor_missing_fields_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ids": []})))
        .mount(&server)
        .await;

    let transport = test_transport();
    let err = CursorPaginator::new(&transport)
        .run(&server.uri(), None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_cursor_handled_failure_ends_walk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport();
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    let on_error = move |_: &Error| {
        counter.fetch_add(1, Ordering::SeqCst);
    };
    let on_error: &ExceptionHandler<'_> = &on_error;

    let position = CursorPaginator::new(&transport)
        .run(&server.uri(), None, None, Some(on_error))
        .await
        .unwrap();

    assert_eq!(position, CursorPosition::start(FIRST_CURSOR));
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cursor_terminal_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let transport = test_transport();
    let err = CursorPaginator::new(&transport)
        .run(&server.uri(), None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TerminalRequest { status: 403, .. }));
}

#[tokio::test]
async fn test_custom_cursor_stops_on_handler() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"previous_cursor": 1, "next_cursor": 2})),
        )
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut seen = 0;
    let mut on_page = |_: &Record, _: CursorPosition| {
        seen += 1;
        seen == 3
    };
    CursorPaginator::new(&transport)
        .run_until(&server.uri(), &mut on_page, None)
        .await
        .unwrap();

    assert_eq!(seen, 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_custom_cursor_stops_on_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"previous_cursor": 0, "next_cursor": 9})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"previous_cursor": -9, "next_cursor": 0})),
        )
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut on_page = |_: &Record, _: CursorPosition| false;
    let position = CursorPaginator::new(&transport)
        .run_until(&format!("{}/ids.json", server.uri()), &mut on_page, None)
        .await
        .unwrap();

    assert!(position.is_last());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ============================================================================
// Window Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_window_sets_bound_then_ends_on_empty_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param_is_missing("max_id"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 50}, {"id": 30}, {"id": 10}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("max_id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut ids = Vec::new();
    let mut on_record = |r: &Record| ids.push(r["id"].as_i64().unwrap());
    let state = WindowPaginator::new(&transport)
        .run(
            &format!("{}/1.1/statuses/user_timeline.json?count=3", server.uri()),
            Some(&mut on_record),
            None,
        )
        .await
        .unwrap();

    assert_eq!(ids, vec![50, 30, 10]);
    assert_eq!(state.max_id, Some(10));
    assert_eq!(state.passes, 2);
    assert_eq!(state.items_received, 0);
}

#[tokio::test]
async fn test_window_bound_strictly_decreases_with_overlap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 50}, {"id": 30}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("max_id", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 30}, {"id": 20}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("max_id", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 20}])))
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut ids = Vec::new();
    let mut on_record = |r: &Record| ids.push(r["id"].as_i64().unwrap());
    let state = WindowPaginator::new(&transport)
        .run(&format!("{}/timeline.json", server.uri()), Some(&mut on_record), None)
        .await
        .unwrap();

    // Boundary records are delivered twice
    assert_eq!(ids, vec![50, 30, 30, 20, 20]);
    assert_eq!(state.max_id, Some(20));

    let bounds: Vec<i64> = query_values(&server, "max_id")
        .await
        .into_iter()
        .flatten()
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(bounds, vec![30, 20]);
    assert!(bounds.windows(2).all(|w| w[1] < w[0]));
}

#[tokio::test]
async fn test_window_delivers_non_numeric_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("max_id"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "not-a-number"}, {"id": 20}, {"text": "no id"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("max_id", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let transport = test_transport();
    let mut delivered = 0;
    let mut on_record = |_: &Record| delivered += 1;
    let state = WindowPaginator::new(&transport)
        .run(&format!("{}/timeline.json", server.uri()), Some(&mut on_record), None)
        .await
        .unwrap();

    assert_eq!(delivered, 3);
    assert_eq!(state.max_id, Some(20));
}

#[tokio::test]
async fn test_window_custom_id_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("max_id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "seq": 70}, {"id": 2, "seq": 60}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("max_id", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport();
    let state = WindowPaginator::new(&transport)
        .with_id_field("seq")
        .run(&format!("{}/timeline.json", server.uri()), None, None)
        .await
        .unwrap();

    assert_eq!(state.max_id, Some(60));
}

// ============================================================================
// Batch Lookup Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_batch_lookup_150_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/lookup.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(2)
        .mount(&server)
        .await;

    let transport = test_transport();
    let ids: Vec<i64> = (1..=150).collect();
    let mut delivered = 0;
    let mut on_record = |_: &Record| delivered += 1;
    let records = BatchLookupPaginator::new(&transport)
        .run(
            &format!("{}/1.1/users/lookup.json", server.uri()),
            &ids,
            &[],
            Some(&mut on_record),
            None,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(delivered, 4);

    let sizes: Vec<usize> = query_values(&server, "user_id")
        .await
        .into_iter()
        .map(|v| v.unwrap_or_default().split(',').count())
        .collect();
    assert_eq!(sizes, vec![100, 50]);
    assert!(query_values(&server, "screen_name")
        .await
        .iter()
        .all(Option::is_none));
}

#[tokio::test]
async fn test_batch_lookup_mixed_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let transport = test_transport();
    BatchLookupPaginator::new(&transport)
        .with_cap(2)
        .run(
            &format!("{}/lookup.json", server.uri()),
            &[10, 20],
            &names(&["alice"]),
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        query_values(&server, "screen_name").await,
        vec![Some("alice".to_string()), None]
    );
    assert_eq!(
        query_values(&server, "user_id").await,
        vec![Some("10".to_string()), Some("20".to_string())]
    );
}

#[tokio::test]
async fn test_batch_lookup_without_keys() {
    let server = MockServer::start().await;
    let transport = test_transport();

    let err = BatchLookupPaginator::new(&transport)
        .run(&server.uri(), &[], &[], None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
