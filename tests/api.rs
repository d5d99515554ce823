use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use meal_planner_api::{
    app,
    config::Config,
    db::InMemoryMealStore,
    models::{
        meal::{MealChoice, MealPeriod},
        user_default::UserDefault,
    },
    AppState,
};

fn router(store: Arc<InMemoryMealStore>) -> Router {
    app(AppState::new(store, Config::local()))
}

fn beatles() -> Arc<InMemoryMealStore> {
    Arc::new(InMemoryMealStore::with_users([(1, "John"), (2, "Paul")]))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn send(router: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            req = req.header("content-type", "application/json");
            Body::from(b.to_string())
        }
        None => Body::empty(),
    };
    let response = router.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, body) = send(router(beatles()), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn health_reports_unreachable_store() {
    let store = Arc::new(InMemoryMealStore::new().unreachable());
    let (status, body) = send(router(store), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn report_for_sunday_uses_defaults_and_fallback() {
    let store = beatles();
    store.insert_default(UserDefault {
        user_id: 1,
        day_of_week: 0,
        lunch: 2,
        dinner: 2,
    });

    let (status, body) = send(router(store), "GET", "/api/meals?date=2025-02-16&days=1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "2025-02-16": [
                {"user_id":1,"user_name":"John","lunch":0,"dinner":0,"defaultLunch":2,"defaultDinner":2},
                {"user_id":2,"user_name":"Paul","lunch":0,"dinner":0,"defaultLunch":1,"defaultDinner":1}
            ]
        })
    );
}

#[tokio::test]
async fn report_overlays_actual_rows() {
    let store = beatles();
    store.insert_meal(MealChoice::new(2, date("2025-02-17"), MealPeriod::Lunch, 3));

    let (status, body) = send(router(store), "GET", "/api/meals?date=2025-02-16&days=3", None).await;

    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["2025-02-16", "2025-02-17", "2025-02-18"]);
    let paul = &body["2025-02-17"][1];
    assert_eq!(paul["user_id"], 2);
    assert_eq!(paul["lunch"], 3);
    assert_eq!(paul["dinner"], 0);
    assert_eq!(paul["defaultLunch"], 1);
}

#[tokio::test]
async fn report_rejects_bad_parameters() {
    for uri in [
        "/api/meals?date=16-02-2025&days=1",
        "/api/meals?days=1",
        "/api/meals?date=2025-02-16&days=0",
        "/api/meals?date=2025-02-16&days=abc",
        "/api/meals?date=2025-02-16",
        "/api/meals?date=2025-02-16&days=367",
        "/api/meals?date=%2B262142-12-31&days=2",
        "/api/meals?date=2025-2-16&days=1",
        "/api/meals?date=%202025-02-16&days=1",
        "/api/meals?date=-0001-02-16&days=1",
        "/api/meals?date=2025-02-16&date=2025-02-17&days=1",
    ] {
        let (status, body) = send(router(beatles()), "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn report_store_failure_is_500() {
    let store = Arc::new(InMemoryMealStore::new().unreachable());
    let (status, body) = send(router(store), "GET", "/api/meals?date=2025-02-16&days=1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bulk_update_writes_two_rows_per_element() {
    let store = beatles();
    let payload = r#"[{"user_id":1,"user_name":"John","date":"2024-02-04","lunch":3,"dinner":2}]"#;

    let (status, body) = send(router(store.clone()), "PUT", "/api/meals/bulk-update", Some(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Meals updated" }));
    assert_eq!(
        store.meal_rows(),
        vec![
            MealChoice::new(1, date("2024-02-04"), MealPeriod::Lunch, 3),
            MealChoice::new(1, date("2024-02-04"), MealPeriod::Dinner, 2),
        ]
    );
}

#[tokio::test]
async fn bulk_update_twice_gives_same_report() {
    let store = beatles();
    let payload = r#"[
        {"user_id":1,"date":"2024-02-04","lunch":3,"dinner":2},
        {"user_id":2,"date":"2024-02-05","lunch":2,"dinner":1}
    ]"#;
    let report_uri = "/api/meals?date=2024-02-04&days=2";

    send(router(store.clone()), "PUT", "/api/meals/bulk-update", Some(payload)).await;
    let (_, first) = send(router(store.clone()), "GET", report_uri, None).await;
    let rows = store.meal_rows();

    send(router(store.clone()), "PUT", "/api/meals/bulk-update", Some(payload)).await;
    let (_, second) = send(router(store.clone()), "GET", report_uri, None).await;

    assert_eq!(store.meal_rows(), rows);
    assert_eq!(first, second);
    assert_eq!(first["2024-02-04"][0]["lunch"], 3);
    assert_eq!(first["2024-02-05"][1]["dinner"], 1);
}

#[tokio::test]
async fn bulk_update_failure_rolls_back() {
    let store = Arc::new(
        InMemoryMealStore::with_users([(1, "John")]).failing_at_statement(2),
    );
    let payload = r#"[{"user_id":1,"date":"2024-02-04","lunch":3,"dinner":2}]"#;

    let (status, body) = send(router(store.clone()), "PUT", "/api/meals/bulk-update", Some(payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (_, report) = send(router(store), "GET", "/api/meals?date=2024-02-04&days=1", None).await;
    assert_eq!(report["2024-02-04"][0]["lunch"], 0);
    assert_eq!(report["2024-02-04"][0]["dinner"], 0);
}

#[tokio::test]
async fn bulk_update_rejects_malformed_body() {
    for payload in [
        "not json",
        r#"{"user_id":1}"#,
        r#"[{"user_id":1,"date":"2024-13-01","lunch":1,"dinner":1}]"#,
        r#"[{"user_id":"one","date":"2024-02-04","lunch":1,"dinner":1}]"#,
    ] {
        let store = beatles();
        let (status, body) =
            send(router(store.clone()), "PUT", "/api/meals/bulk-update", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(body["error"].is_string(), "{payload}");
        assert!(store.meal_rows().is_empty());
    }
}

#[tokio::test]
async fn user_defaults_round_trip_through_report() {
    let store = beatles();
    let payload = r#"[
        {"day_of_week":1,"lunch":3,"dinner":2},
        {"day_of_week":0,"lunch":2,"dinner":2}
    ]"#;

    let (status, body) =
        send(router(store.clone()), "PUT", "/api/user-defaults/2", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User defaults updated" }));

    let (status, body) = send(router(store.clone()), "GET", "/api/user-defaults/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"user_id":2,"day_of_week":0,"lunch":2,"dinner":2},
            {"user_id":2,"day_of_week":1,"lunch":3,"dinner":2}
        ])
    );

    // 2025-02-17 is a Monday.
    let (_, report) = send(router(store), "GET", "/api/meals?date=2025-02-17&days=1", None).await;
    let paul = &report["2025-02-17"][1];
    assert_eq!(paul["defaultLunch"], 3);
    assert_eq!(paul["defaultDinner"], 2);
}

#[tokio::test]
async fn user_defaults_empty_for_unknown_user() {
    let (status, body) = send(router(beatles()), "GET", "/api/user-defaults/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn user_defaults_reject_bad_input() {
    let (status, _) = send(router(beatles()), "GET", "/api/user-defaults/john", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        router(beatles()),
        "PUT",
        "/api/user-defaults/1",
        Some(r#"[{"day_of_week":7,"lunch":1,"dinner":1}]"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(router(beatles()), "PUT", "/api/user-defaults/1", Some("[{")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_defaults_failure_rolls_back() {
    let store = Arc::new(InMemoryMealStore::with_users([(1, "John")]).failing_at_statement(2));
    let payload = r#"[
        {"day_of_week":0,"lunch":3,"dinner":3},
        {"day_of_week":1,"lunch":3,"dinner":3}
    ]"#;

    let (status, _) = send(router(store.clone()), "PUT", "/api/user-defaults/1", Some(payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, body) = send(router(store), "GET", "/api/user-defaults/1", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn metrics_endpoint_exposes_counters() {
    let store = beatles();
    send(router(store.clone()), "GET", "/api/meals?date=2025-02-16&days=1", None).await;

    let response = router(store)
        .oneshot(Request::get("/api/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains("meal_reports_total"));
}
