/// HTTP gateway tests
///
/// Drives the router in-process: status codes, JSON shapes, and empty
/// bodies on every error.
/// Run with: cargo test --test http_api_tests

mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use common::fixture;
use serde_json::{Value, json};
use travelsdb::{AppState, build_router};
use tower::ServiceExt;

fn app() -> axum::Router {
    build_router(AppState::new(fixture()))
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Body,
) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, None);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, Some(json))
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Option<Value>) {
    send(app, Method::GET, uri, Body::empty()).await
}

async fn post(app: &axum::Router, uri: &str, payload: Value) -> (StatusCode, Option<Value>) {
    send(app, Method::POST, uri, Body::from(payload.to_string())).await
}

async fn post_raw(app: &axum::Router, uri: &str, payload: &str) -> (StatusCode, Option<Value>) {
    send(app, Method::POST, uri, Body::from(payload.to_string())).await
}

#[tokio::test]
async fn test_get_entities_by_id() {
    let app = app();

    let (status, body) = get(&app, "/users/1").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.expect("user body");
    assert_eq!(body["email"], "user1@mail.test");
    assert_eq!(body["gender"], "m");
    assert!(body.get("age").is_none());

    let (status, body) = get(&app, "/locations/12").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        Some(json!({
            "id": 12,
            "place": "Fjord",
            "country": "Norway",
            "city": "City12",
            "distance": 20
        }))
    );

    let (status, body) = get(&app, "/visits/101").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        Some(json!({
            "id": 101,
            "location": 10,
            "user": 2,
            "visited_at": 100,
            "mark": 2
        }))
    );
}

#[tokio::test]
async fn test_unknown_entities_are_404_with_empty_body() {
    let app = app();

    for uri in [
        "/users/99",
        "/users/abc",
        "/users/new",
        "/users/-1",
        "/locations/0",
        "/visits/4294967296",
        "/trips/1",
        "/users/99/visits",
        "/users/x/visits",
        "/locations/99/avg",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        assert!(body.is_none(), "GET {uri} should have an empty body");
    }
}

#[tokio::test]
async fn test_list_user_visits_with_filters() {
    let app = app();

    let (status, body) = get(&app, "/users/1/visits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        Some(json!({
            "visits": [
                {"mark": 1, "visited_at": 50, "place": "Fjord"},
                {"mark": 3, "visited_at": 150, "place": "Beach"},
                {"mark": 5, "visited_at": 300, "place": "Pier"}
            ]
        }))
    );

    let (status, body) = get(&app, "/users/1/visits?country=Norway&fromDate=60").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        Some(json!({"visits": [{"mark": 5, "visited_at": 300, "place": "Pier"}]}))
    );

    let (status, body) = get(&app, "/users/2/visits?toDistance=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({"visits": []})));
}

#[tokio::test]
async fn test_location_average_with_filters() {
    let app = app();

    let (status, body) = get(&app, "/locations/10/avg").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({"avg": 3.66667})));

    let (status, body) = get(&app, "/locations/10/avg?gender=f&fromAge=40").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({"avg": 4.0})));

    let (status, body) = get(&app, "/locations/11/avg?toDate=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.expect("avg body")["avg"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_malformed_filters_are_400() {
    let app = app();

    for uri in [
        "/users/1/visits?fromDate=abc",
        "/users/1/visits?toDistance=-3",
        "/locations/10/avg?gender=x",
        "/locations/10/avg?fromAge=",
        "/locations/10/avg?toAge=1.5",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {uri}");
        assert!(body.is_none());
    }
}

#[tokio::test]
async fn test_unknown_owner_wins_over_bad_filter() {
    let app = app();

    let (status, _) = get(&app, "/users/77/visits?fromDate=abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/locations/77/avg?gender=x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_entities_then_query() {
    let app = app();

    let (status, body) = post(
        &app,
        "/users/new",
        json!({
            "id": 40,
            "email": "new@mail.test",
            "first_name": "New",
            "last_name": "Comer",
            "gender": "f",
            "birth_date": 0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({})));

    let (status, _) = post(
        &app,
        "/locations/new",
        json!({"id": 41, "place": "Lake", "country": "Finland", "city": "Oulu", "distance": 9}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &app,
        "/visits/new",
        json!({"id": 140, "location": 41, "user": 40, "visited_at": 77, "mark": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/users/40/visits").await;
    assert_eq!(
        body,
        Some(json!({"visits": [{"mark": 4, "visited_at": 77, "place": "Lake"}]}))
    );
    let (_, body) = get(&app, "/locations/41/avg").await;
    assert_eq!(body, Some(json!({"avg": 4.0})));
}

#[tokio::test]
async fn test_invalid_creates_are_400() {
    let app = app();

    let cases = [
        ("/users/new", r#"{"id": 41, "email": "a@b.c"}"#),
        ("/users/new", "not json"),
        (
            "/users/new",
            r#"{"id": 1, "email": "a@b.c", "first_name": "A", "last_name": "B", "gender": "m", "birth_date": 0}"#,
        ),
        (
            "/locations/new",
            r#"{"id": 42, "place": "Lake", "country": "Finland", "city": "Oulu", "distance": null}"#,
        ),
        (
            "/visits/new",
            r#"{"id": 141, "location": 99, "user": 1, "visited_at": 1, "mark": 1}"#,
        ),
    ];
    for (uri, payload) in cases {
        let (status, body) = post_raw(&app, uri, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "POST {uri} {payload}");
        assert!(body.is_none());
    }

    let (status, _) = get(&app, "/visits/141").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_entities() {
    let app = app();

    let (status, body) = post(&app, "/locations/11", json!({"distance": 3, "city": "Malaga"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({})));

    let (_, body) = get(&app, "/locations/11").await;
    let body = body.expect("location body");
    assert_eq!(body["distance"], 3);
    assert_eq!(body["city"], "Malaga");
    assert_eq!(body["place"], "Beach");

    let (status, _) = post(&app, "/visits/103", json!({"location": 10, "mark": 0})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/locations/10/avg").await;
    // marks 5, 2, 4, 0
    assert_eq!(body, Some(json!({"avg": 2.75})));
    let (_, body) = get(&app, "/locations/11/avg").await;
    assert_eq!(body.expect("avg body")["avg"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_update_user_birth_date_changes_age_filter() {
    let app = app();

    // user 2 was 20; a birth date at the epoch makes them 47
    let (status, _) = post(&app, "/users/2", json!({"birth_date": 0})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/locations/10/avg?fromAge=46&gender=f").await;
    assert_eq!(body, Some(json!({"avg": 2.0})));
}

#[tokio::test]
async fn test_invalid_updates_are_400_and_change_nothing() {
    let app = app();

    let cases = [
        ("/users/1", r#"{"id": 5}"#),
        ("/users/1", r#"{"email": null}"#),
        ("/users/1", r#"{"email": ""}"#),
        ("/users/1", r#"{"birth_date": "old"}"#),
        ("/users/1", "[]"),
        ("/locations/10", r#"{"distance": -1}"#),
        ("/visits/100", r#"{"location": 99}"#),
        ("/visits/100", r#"{"user": 5000000}"#),
        ("/visits/100", r#"{"mark": 300}"#),
    ];
    for (uri, payload) in cases {
        let (status, body) = post_raw(&app, uri, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "POST {uri} {payload}");
        assert!(body.is_none());
    }

    let (_, body) = get(&app, "/visits/100").await;
    assert_eq!(
        body,
        Some(json!({"id": 100, "location": 10, "user": 1, "visited_at": 300, "mark": 5}))
    );
    let (_, body) = get(&app, "/users/1").await;
    assert_eq!(body.expect("user body")["email"], "user1@mail.test");
}

#[tokio::test]
async fn test_update_unknown_entity_is_404() {
    let app = app();

    for uri in ["/users/99", "/locations/abc", "/visits/0"] {
        let (status, body) = post(&app, uri, json!({"id": 1})).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "POST {uri}");
        assert!(body.is_none());
    }
}

#[tokio::test]
async fn test_undecodable_id_segments_are_404_with_empty_body() {
    let app = app();

    for uri in ["/users/%FF", "/users/%FF/visits", "/locations/%C3/avg", "/visits/%E2%82"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        assert!(body.is_none(), "GET {uri} should have an empty body");
    }

    let (status, body) = post(&app, "/users/%FF", json!({"email": "x@mail.test"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_none());
}
