// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP API
//!
//! Axum router over the moderation services. Handlers parse identifiers,
//! extract the acting user and delegate; they hold no rules of their own.
//!
//! The acting user arrives in the `x-user-id` header, set by the
//! authentication layer in front of this service. Routes that act on behalf
//! of a user answer `401` without it.
//!
//! | Error kind | Status |
//! |------------|--------|
//! | `validation_error` | 400 |
//! | `unauthorized` | 401 |
//! | `forbidden` | 403 |
//! | `not_found` | 404 |
//! | `business_rule_error` | 409 |
//! | `storage_error` | 500 |

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::{CommentService, DiscoveryWorkflow, VoteLedger};
use crate::domain::comment::{ArticleId, Comment, CommentId, CommentRoot};
use crate::domain::discovery::{Discovery, DiscoveryChanges, DiscoveryId, DiscoveryState, NewDiscovery, ObjectType};
use crate::domain::error::ModerationError;
use crate::domain::thread::CommentTree;
use crate::domain::user::UserId;
use crate::domain::vote::Vote;

pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<DiscoveryWorkflow>,
    pub ledger: Arc<VoteLedger>,
    pub comments: Arc<CommentService>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/discoveries", post(submit_handler).get(list_handler))
        .route(
            "/discoveries/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/discoveries/{id}/community-review", post(community_review_handler))
        .route("/discoveries/{id}/astronomer-review", post(astronomer_review_handler))
        .route("/discoveries/{id}/validate", post(approve_handler))
        .route("/discoveries/{id}/reject", post(reject_handler))
        .route("/discoveries/{id}/vote", post(cast_vote_handler).delete(remove_vote_handler))
        .route("/discoveries/{id}/votes", get(votes_handler))
        .route("/discoveries/{id}/comments", get(discovery_thread_handler))
        .route("/articles/{id}/comments", get(article_thread_handler))
        .route("/comments", post(post_comment_handler))
        .route("/comments/{id}", put(edit_comment_handler))
        .route("/comments/{id}/deactivate", post(deactivate_comment_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Moderation(err) => {
                let status = match err {
                    ModerationError::Validation(_) => StatusCode::BAD_REQUEST,
                    ModerationError::Forbidden(_) => StatusCode::FORBIDDEN,
                    ModerationError::NotFound(_) => StatusCode::NOT_FOUND,
                    ModerationError::BusinessRule(_) => StatusCode::CONFLICT,
                    ModerationError::Repository(e) => {
                        error!("Storage error: {}", e);
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({ "error": err.kind(), "message": "internal storage error" })),
                        )
                            .into_response();
                    }
                };
                (status, err.kind(), err.to_string())
            }
        };

        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_discovery_id(raw: &str) -> ApiResult<DiscoveryId> {
    DiscoveryId::from_string(raw).map_err(|_| ApiError::BadRequest(format!("invalid discovery id: {}", raw)))
}

fn parse_comment_id(raw: &str) -> ApiResult<CommentId> {
    CommentId::from_string(raw).map_err(|_| ApiError::BadRequest(format!("invalid comment id: {}", raw)))
}

// ============================================================================
// Acting user
// ============================================================================

/// User on whose behalf the request acts, from the `x-user-id` header
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", USER_HEADER)))?;
        let raw = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized(format!("malformed {} header", USER_HEADER)))?;
        UserId::from_string(raw.trim())
            .map(ActingUser)
            .map_err(|_| ApiError::Unauthorized(format!("malformed {} header", USER_HEADER)))
    }
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitDiscoveryRequest {
    pub object_type: ObjectType,
    pub suggested_name: String,
    pub right_ascension: f64,
    pub declination: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attachments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub state: Option<String>,
    pub reporter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub is_upvote: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct VotesResponse {
    pub upvotes: u64,
    pub downvotes: u64,
    pub total: u64,
    pub approval_rate: f64,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Deserialize)]
pub struct PostCommentRequest {
    pub root: CommentRoot,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub content: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit_handler(
    State(state): State<Arc<AppState>>,
    ActingUser(reporter_id): ActingUser,
    Json(body): Json<SubmitDiscoveryRequest>,
) -> ApiResult<(StatusCode, Json<Discovery>)> {
    let discovery = state
        .workflow
        .submit(NewDiscovery {
            reporter_id,
            object_type: body.object_type,
            suggested_name: body.suggested_name,
            right_ascension: body.right_ascension,
            declination: body.declination,
            description: body.description,
            attachments: body.attachments,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(discovery)))
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Discovery>>> {
    let reporter = query
        .reporter
        .as_deref()
        .map(|r| UserId::from_string(r).map_err(|_| ApiError::BadRequest(format!("invalid reporter id: {}", r))))
        .transpose()?;

    let discoveries = match (query.state.as_deref(), reporter) {
        (Some(raw), reporter) => {
            let discovery_state = raw.parse::<DiscoveryState>().map_err(ApiError::BadRequest)?;
            let mut list = state.workflow.list_by_state(discovery_state).await?;
            if let Some(reporter) = reporter {
                list.retain(|d| d.reporter_id == reporter);
            }
            list
        }
        (None, Some(reporter)) => state.workflow.list_by_reporter(reporter).await?,
        (None, None) => {
            return Err(ApiError::BadRequest("state or reporter query parameter is required".to_string()))
        }
    };
    Ok(Json(discoveries))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Discovery>> {
    let id = parse_discovery_id(&id)?;
    Ok(Json(state.workflow.get(id).await?))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    Json(changes): Json<DiscoveryChanges>,
) -> ApiResult<Json<Discovery>> {
    let id = parse_discovery_id(&id)?;
    Ok(Json(state.workflow.update(id, user, changes).await?))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> ApiResult<StatusCode> {
    let id = parse_discovery_id(&id)?;
    state.workflow.delete(id, user).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn community_review_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Discovery>> {
    let id = parse_discovery_id(&id)?;
    Ok(Json(state.workflow.open_community_review(id, user).await?))
}

async fn astronomer_review_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Discovery>> {
    let id = parse_discovery_id(&id)?;
    Ok(Json(state.workflow.advance_to_astronomer_review(id, user).await?))
}

async fn approve_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Discovery>> {
    let id = parse_discovery_id(&id)?;
    Ok(Json(state.workflow.approve(id, user).await?))
}

async fn reject_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    body: Bytes,
) -> ApiResult<Json<Discovery>> {
    let id = parse_discovery_id(&id)?;
    // the reason is optional, so is the body
    let body: RejectRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RejectRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(format!("invalid reject body: {}", e)))?
    };
    Ok(Json(state.workflow.reject(id, user, &body.reason).await?))
}

async fn cast_vote_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(voter): ActingUser,
    Json(body): Json<CastVoteRequest>,
) -> ApiResult<(StatusCode, Json<Vote>)> {
    let id = parse_discovery_id(&id)?;
    let vote = state.ledger.cast(id, voter, body.is_upvote, body.comment).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

async fn remove_vote_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(voter): ActingUser,
) -> ApiResult<StatusCode> {
    let id = parse_discovery_id(&id)?;
    state.ledger.remove(id, voter).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn votes_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<VotesResponse>> {
    let id = parse_discovery_id(&id)?;
    let votes = state.ledger.votes(id).await?;
    let tally = state.ledger.tally(id).await?;
    Ok(Json(VotesResponse {
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
        total: tally.total(),
        approval_rate: tally.approval_rate(),
        votes,
    }))
}

async fn discovery_thread_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<CommentTree>>> {
    let id = parse_discovery_id(&id)?;
    Ok(Json(state.comments.thread(CommentRoot::Discovery(id)).await?))
}

async fn article_thread_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<CommentTree>>> {
    let id = ArticleId::from_string(&id).map_err(|_| ApiError::BadRequest(format!("invalid article id: {}", id)))?;
    Ok(Json(state.comments.thread(CommentRoot::Article(id)).await?))
}

async fn post_comment_handler(
    State(state): State<Arc<AppState>>,
    ActingUser(author): ActingUser,
    Json(body): Json<PostCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .comments
        .post(body.root, author, &body.content, body.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn edit_comment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    Json(body): Json<EditCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let id = parse_comment_id(&id)?;
    Ok(Json(state.comments.edit(id, user, &body.content).await?))
}

async fn deactivate_comment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> ApiResult<Json<Comment>> {
    let id = parse_comment_id(&id)?;
    Ok(Json(state.comments.deactivate(id, user).await?))
}
