// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP surface tests: status mapping, the acting-user header and request
//! bodies, driven through the router with `oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use astrodex_core::domain::comment::{Comment, CommentRoot};
use astrodex_core::domain::discovery::DiscoveryId;
use astrodex_core::domain::repository::CommentRepository;
use astrodex_core::domain::user::UserId;
use astrodex_core::presentation::api::{self, AppState, USER_HEADER};

use common::{Harness, MAX_DEPTH};

fn router(h: &Harness) -> Router {
    api::app(AppState {
        workflow: h.workflow.clone(),
        ledger: h.ledger.clone(),
        comments: h.comments.clone(),
    })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<UserId>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn submission(ra: f64) -> Value {
    json!({
        "object_type": "comet",
        "suggested_name": "C/2026 Q1",
        "right_ascension": ra,
        "declination": -12.5,
        "description": "Faint fuzzy object"
    })
}

async fn submit(app: &Router, reporter: UserId) -> String {
    let (status, body) = send(app, "POST", "/discoveries", Some(reporter), Some(submission(187.25))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new();
    let (status, body) = send(&router(&h), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_requires_acting_user() {
    let h = Harness::new();
    let (status, body) = send(&router(&h), "POST", "/discoveries", None, Some(submission(187.25))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_malformed_user_header_is_unauthorized() {
    let h = Harness::new();
    let request = Request::builder()
        .method("POST")
        .uri("/discoveries")
        .header(USER_HEADER, "not-a-uuid")
        .header("content-type", "application/json")
        .body(Body::from(submission(187.25).to_string()))
        .unwrap();
    let response = router(&h).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_and_get() {
    let h = Harness::new();
    let app = router(&h);

    let id = submit(&app, h.reporter).await;
    let (status, body) = send(&app, "GET", &format!("/discoveries/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "pending");
    assert_eq!(body["reporter_id"], h.reporter.to_string());
}

#[tokio::test]
async fn test_invalid_coordinates_are_bad_request() {
    let h = Harness::new();
    let (status, body) = send(
        &router(&h),
        "POST",
        "/discoveries",
        Some(h.reporter),
        Some(submission(400.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_unknown_discovery_is_not_found() {
    let h = Harness::new();
    let uri = format!("/discoveries/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&router(&h), "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&router(&h), "GET", "/discoveries/garbage", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_flow_status_codes() {
    let h = Harness::new();
    let app = router(&h);
    let id = submit(&app, h.reporter).await;
    let vote_uri = format!("/discoveries/{}/vote", id);

    let (status, _) = send(&app, "POST", &vote_uri, Some(h.researcher), Some(json!({ "is_upvote": true }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", &vote_uri, Some(h.researcher), Some(json!({ "is_upvote": false }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = send(&app, "POST", &vote_uri, Some(h.reporter), Some(json!({ "is_upvote": true }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "business_rule_error");

    let (status, body) = send(&app, "GET", &format!("/discoveries/{}/votes", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upvotes"], 1);
    assert_eq!(body["total"], 1);
    assert_eq!(body["approval_rate"], 1.0);

    let (status, _) = send(&app, "DELETE", &vote_uri, Some(h.researcher), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &vote_uri, Some(h.researcher), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_endpoints() {
    let h = Harness::new();
    let app = router(&h);
    let id = submit(&app, h.reporter).await;

    let community_uri = format!("/discoveries/{}/community-review", id);
    let (status, _) = send(&app, "POST", &community_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "POST", &community_uri, Some(h.researcher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "community_review");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/discoveries/{}/astronomer-review", id),
        Some(h.researcher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let validate_uri = format!("/discoveries/{}/validate", id);
    let (status, body) = send(&app, "POST", &validate_uri, Some(h.researcher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = send(&app, "POST", &validate_uri, Some(h.astronomer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "approved");
    assert_eq!(body["verified_by"], h.astronomer.to_string());
}

#[tokio::test]
async fn test_reporter_cannot_advance_over_http() {
    let h = Harness::new();
    let app = router(&h);
    let id = submit(&app, h.reporter).await;

    let community_uri = format!("/discoveries/{}/community-review", id);
    let (status, body) = send(&app, "POST", &community_uri, Some(h.reporter), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send(&app, "POST", &community_uri, Some(h.astronomer), None).await;
    assert_eq!(status, StatusCode::OK);

    let astronomer_uri = format!("/discoveries/{}/astronomer-review", id);
    let (status, body) = send(&app, "POST", &astronomer_uri, Some(h.reporter), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (_, body) = send(&app, "GET", &format!("/discoveries/{}", id), None, None).await;
    assert_eq!(body["state"], "community_review");
}

#[tokio::test]
async fn test_reject_body_is_optional() {
    let h = Harness::new();
    let app = router(&h);

    let first = submit(&app, h.reporter).await;
    let (status, body) = send(&app, "POST", &format!("/discoveries/{}/reject", first), Some(h.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "rejected");

    let second = submit(&app, h.reporter).await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/discoveries/{}/reject", second),
        Some(h.admin),
        Some(json!({ "reason": "satellite glint" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["description"].as_str().unwrap().contains("satellite glint"));

    let (status, body) = send(&app, "POST", &format!("/discoveries/{}/reject", second), Some(h.admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "business_rule_error");
}

#[tokio::test]
async fn test_list_requires_filter() {
    let h = Harness::new();
    let app = router(&h);
    submit(&app, h.reporter).await;

    let (status, _) = send(&app, "GET", "/discoveries", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/discoveries?state=pending", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", &format!("/discoveries?reporter={}", h.researcher), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_thread_over_http() {
    let h = Harness::new();
    let app = router(&h);
    let id = submit(&app, h.reporter).await;

    let (status, parent) = send(
        &app,
        "POST",
        "/comments",
        Some(h.researcher),
        Some(json!({ "root": { "type": "discovery", "id": id }, "content": "Seen it too" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/comments",
        Some(h.astronomer),
        Some(json!({
            "root": { "type": "discovery", "id": id },
            "content": "Which filter?",
            "parent_id": parent["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, thread) = send(&app, "GET", &format!("/discoveries/{}/comments", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let thread = thread.as_array().unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0]["id"], parent["id"]);
    assert_eq!(thread[0]["replies"].as_array().unwrap().len(), 1);

    let comment_uri = format!("/comments/{}", parent["id"].as_str().unwrap());
    let (status, _) = send(&app, "PUT", &comment_uri, Some(h.admin), Some(json!({ "content": "edited" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", &format!("{}/deactivate", comment_uri), Some(h.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
async fn test_deep_thread_over_http() {
    let h = Harness::new();
    let app = router(&h);
    let id = submit(&app, h.reporter).await;
    let root = CommentRoot::Discovery(DiscoveryId::from_string(&id).unwrap());

    let mut parent = None;
    for n in 0..5_000 {
        let comment = Comment::new(root, h.researcher, &format!("link {}", n), parent, 2000).unwrap();
        h.repos.comments.insert(&comment).await.unwrap();
        parent = Some(comment.id);
    }

    let (status, thread) = send(&app, "GET", &format!("/discoveries/{}/comments", id), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let mut node = &thread[0];
    let mut depth = 0;
    while let Some(reply) = node["replies"].as_array().and_then(|r| r.first()) {
        node = reply;
        depth += 1;
    }
    assert_eq!(depth, MAX_DEPTH);

    // posting below the rendered bottom is refused
    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(h.astronomer),
        Some(json!({ "root": { "type": "discovery", "id": id }, "content": "deeper", "parent_id": node["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
