use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use qcu_calendar::{
    cache::{self, Cache},
    server::{router, AppState},
    CalendarEvent, CalendarQuery, EventStore, Holiday, MemoryStore, StoreError,
};
use tokio::time::Duration;

fn app_with(store: impl EventStore + 'static) -> Router {
    router(AppState::new(Arc::new(store), Cache::disabled()))
}

fn app() -> Router {
    app_with(MemoryStore::portal_fixture())
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn calendar_merges_university_events_and_holidays() {
    let (status, json) = get_json(app(), "/calendar?school_year=2025-2026").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["school_year"], "2025-2026");
    assert_eq!(json["total_events"], 12);

    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 12);

    let starts: Vec<&str> = events
        .iter()
        .map(|event| event["start_date"].as_str().unwrap())
        .collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);

    assert_eq!(events[0]["title"], "New Year");
    assert_eq!(events[0]["start_date"], "2025-01-01");
    assert_eq!(events[0]["source"], "Holiday");
    assert_eq!(events[0]["event_type"], "holiday");
}

#[tokio::test]
async fn calendar_applies_exact_filters() {
    let (status, json) = get_json(
        app(),
        "/calendar?school_year=2025-2026&semester=2nd&event_type=exam",
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let university: Vec<&Value> = json["events"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|event| event["source"] == "University")
        .collect();

    assert_eq!(university.len(), 2);
    assert!(university.iter().all(|event| event["event_type"] == "exam"));
    assert!(university.iter().all(|event| event["semester"] == "2nd"));
}

#[tokio::test]
async fn calendar_with_other_school_year_only_has_holidays() {
    let (status, json) = get_json(app(), "/calendar?school_year=2030-2031").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_events"], 7);
    assert_eq!(json["events"][0]["start_date"], "2030-01-01");
}

#[tokio::test]
async fn malformed_school_year_is_rejected() {
    let (status, json) = get_json(app(), "/calendar?school_year=2025").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("2025"));
}

#[tokio::test]
async fn store_failure_is_a_generic_server_error() {
    let (status, json) = get_json(
        app_with(MemoryStore::unavailable()),
        "/calendar?school_year=2025-2026",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Server error");
}

#[tokio::test]
async fn month_view_builds_grid_with_events() {
    let (status, json) = get_json(
        app(),
        "/calendar/month?month=2026-01&week_start=monday&school_year=2025-2026",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reference_month"], "2026-01");
    assert_eq!(json["week_starts_on"], "monday");

    let cells = json["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 35);
    assert_eq!(cells[0]["date"], "2025-12-29");
    assert_eq!(cells[0]["in_current_month"], false);

    let enrollment_days = cells
        .iter()
        .filter(|cell| {
            cell["events"]
                .as_array()
                .unwrap()
                .iter()
                .any(|event| event["title"] == "Enrollment Period")
        })
        .count();
    assert_eq!(enrollment_days, 5);
}

#[tokio::test]
async fn month_view_defaults_to_sunday_weeks() {
    let (status, json) = get_json(app(), "/calendar/month?month=2026-01&school_year=2025-2026").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["week_starts_on"], "sunday");
    assert_eq!(json["cells"][0]["date"], "2025-12-28");
}

#[tokio::test]
async fn month_view_rejects_bad_parameters() {
    let (status, _) = get_json(app(), "/calendar/month?month=2026-13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app(), "/calendar/month?month=2026-01&week_start=friday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ics_export_contains_month_events() {
    let (status, headers, body) = get(
        app(),
        "/calendar/ics?month=2026-01&school_year=2025-2026",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "text/calendar; charset=utf-8"
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"qcu_calendar_2026_01.ics\""
    );

    assert_eq!(body.matches("BEGIN:VEVENT").count(), 2);
    assert!(body.contains("SUMMARY:Enrollment Period"));
    assert!(body.contains("DTSTART;VALUE=DATE:20260105"));
    assert!(body.contains("DTEND;VALUE=DATE:20260110"));
    assert!(body.contains("DTSTART;VALUE=DATE:20260112"));
    assert!(body.contains("DTEND;VALUE=DATE:20260113"));
    assert!(!body.contains("Midterm"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, _, _) = get(app(), "/grades").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Wraps a store and counts every read that reaches it.
struct CountingStore {
    inner: MemoryStore,
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl EventStore for CountingStore {
    async fn university_events(
        &self,
        query: &CalendarQuery,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.university_events(query).await
    }

    async fn holidays(&self) -> Result<Vec<Holiday>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.holidays().await
    }
}

fn counted_app(enable_cache: bool) -> (Router, Arc<AtomicUsize>) {
    let reads = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: MemoryStore::portal_fixture(),
        reads: Arc::clone(&reads),
    };
    let cache = Cache::new(cache::Config {
        enabled: enable_cache,
        ttl: Duration::from_secs(3600),
    });

    (router(AppState::new(Arc::new(store), cache)), reads)
}

#[tokio::test]
async fn cached_calendar_skips_the_store() {
    let (app, reads) = counted_app(true);

    let (first, _) = get_json(app.clone(), "/calendar?school_year=2025-2026").await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    let (second, json) = get_json(app.clone(), "/calendar?school_year=2025-2026").await;
    assert_eq!(second, StatusCode::OK);
    assert_eq!(json["total_events"], 12);
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    // Month views share the cached aggregate of the same query.
    let (month, _) = get_json(
        app.clone(),
        "/calendar/month?month=2026-01&school_year=2025-2026",
    )
    .await;
    assert_eq!(month, StatusCode::OK);
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    // A different filter is a different key.
    let (filtered, _) = get_json(
        app,
        "/calendar?school_year=2025-2026&event_type=exam",
    )
    .await;
    assert_eq!(filtered, StatusCode::OK);
    assert_eq!(reads.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn disabled_cache_reads_the_store_every_time() {
    let (app, reads) = counted_app(false);

    for _ in 0..2 {
        let (status, _) = get_json(app.clone(), "/calendar?school_year=2025-2026").await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(reads.load(Ordering::SeqCst), 4);
}
