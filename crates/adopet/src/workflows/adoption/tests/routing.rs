use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::adoption::router::{adoption_router, AdoptionState};
use crate::workflows::adoption::{AdoptionConfig, AdoptionService};

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn rex_payload() -> Value {
    json!({
        "name": "Rex",
        "age": "2",
        "weight": "10",
        "color": "brown",
        "images": ["a.jpg"],
    })
}

async fn create_rex(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(request("POST", "/api/v1/pets", Some("owner-token"), Some(rex_payload())))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    payload["pet"]["id"]
        .as_str()
        .expect("pet id")
        .to_string()
}

#[tokio::test]
async fn create_requires_credentials() {
    let (router, store) = build_router();

    let response = router
        .clone()
        .oneshot(request("POST", "/api/v1/pets", None, Some(rex_payload())))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(request("POST", "/api/v1/pets", Some("bogus"), Some(rex_payload())))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("invalid"));

    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn create_reports_validation_errors() {
    let (router, _) = build_router();
    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/pets",
            Some("owner-token"),
            Some(json!({ "name": "Rex", "images": ["a.jpg"] })),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], "required field 'age' is missing");
}

#[tokio::test]
async fn adoption_scenario_over_http() {
    let (router, _) = build_router();
    let pet_id = create_rex(&router).await;

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/pets", None, None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["pets"][0]["id"], json!(pet_id));
    assert_eq!(payload["pets"][0]["available"], json!(true));

    let schedule_uri = format!("/api/v1/pets/{pet_id}/schedule");
    let response = router
        .clone()
        .oneshot(request("PATCH", &schedule_uri, Some("visitor-token"), None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("+55 11 99999-0000"));

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/me/adoptions", Some("visitor-token"), None))
        .await
        .expect("router dispatch");
    let payload = read_json_body(response).await;
    assert_eq!(payload["pets"].as_array().map(Vec::len), Some(1));

    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/pets/{pet_id}/conclude"),
            Some("owner-token"),
            None,
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["pet"]["available"], json!(false));

    let response = router
        .oneshot(request("PATCH", &schedule_uri, Some("visitor-token"), None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn owner_schedule_is_forbidden() {
    let (router, _) = build_router();
    let pet_id = create_rex(&router).await;

    let response = router
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/pets/{pet_id}/schedule"),
            Some("owner-token"),
            None,
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn get_maps_invalid_and_missing_ids() {
    let (router, _) = build_router();

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/pets/123", None, None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .oneshot(request(
            "GET",
            "/api/v1/pets/8d0c5a2e-3c43-4c8f-9f0b-5b1e0e6f7a10",
            None,
            None,
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_map_invalid_and_missing_ids() {
    let (router, _) = build_router();
    let missing = "8d0c5a2e-3c43-4c8f-9f0b-5b1e0e6f7a10";

    for (pet_id, expected) in [
        ("123", StatusCode::UNPROCESSABLE_ENTITY),
        (missing, StatusCode::NOT_FOUND),
    ] {
        let calls = [
            request(
                "PATCH",
                &format!("/api/v1/pets/{pet_id}"),
                Some("owner-token"),
                Some(rex_payload()),
            ),
            request(
                "DELETE",
                &format!("/api/v1/pets/{pet_id}"),
                Some("owner-token"),
                None,
            ),
            request(
                "PATCH",
                &format!("/api/v1/pets/{pet_id}/schedule"),
                Some("visitor-token"),
                None,
            ),
            request(
                "PATCH",
                &format!("/api/v1/pets/{pet_id}/conclude"),
                Some("owner-token"),
                None,
            ),
        ];
        for call in calls {
            let uri = call.uri().to_string();
            let response = router.clone().oneshot(call).await.expect("router dispatch");
            assert_eq!(response.status(), expected, "{uri}");
            let payload = read_json_body(response).await;
            assert!(payload["message"].is_string(), "{uri}");
        }
    }
}

#[tokio::test]
async fn mistyped_body_reports_json_message() {
    let (router, store) = build_router();
    let mut payload = rex_payload();
    payload["age"] = json!(2);

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/pets",
            Some("owner-token"),
            Some(payload.clone()),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["message"]
        .as_str()
        .is_some_and(|message| message.contains("age")));

    let response = router
        .oneshot(request("POST", "/api/v1/pets", None, Some(payload)))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn non_owner_update_and_delete_are_forbidden() {
    let (router, store) = build_router();
    let pet_id = create_rex(&router).await;
    let before = store.snapshot();
    let uri = format!("/api/v1/pets/{pet_id}");

    let mut edit = rex_payload();
    edit["name"] = json!("Max");
    let response = router
        .clone()
        .oneshot(request("PATCH", &uri, Some("visitor-token"), Some(edit)))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some("visitor-token"), None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.snapshot(), before);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some("owner-token"), None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(request("GET", &uri, None, None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_listing_only_shows_own_pets() {
    let (router, _) = build_router();
    create_rex(&router).await;

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/me/pets", Some("owner-token"), None))
        .await
        .expect("router dispatch");
    let payload = read_json_body(response).await;
    assert_eq!(payload["pets"].as_array().map(Vec::len), Some(1));

    let response = router
        .oneshot(request("GET", "/api/v1/me/pets", Some("visitor-token"), None))
        .await
        .expect("router dispatch");
    let payload = read_json_body(response).await;
    assert_eq!(payload["pets"], json!([]));
}

#[tokio::test]
async fn store_outage_returns_internal_error() {
    let service = Arc::new(AdoptionService::new(
        Arc::new(UnavailableStore),
        AdoptionConfig::default(),
    ));
    let router = adoption_router(AdoptionState::new(
        service,
        Arc::new(MemoryIdentities::with_users()),
    ));

    let response = router
        .oneshot(request("GET", "/api/v1/pets", None, None))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
