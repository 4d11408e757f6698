//! HTTP routes.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and
//! `Result<Path<T>, PathRejection>` so malformed bodies and ids answer 400
//! in the common `{"error": ...}` shape.

use crate::error::{ApiError, INVALID_CREDENTIALS_MESSAGE};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use hohm_core::{
    AccountService, CommentNotification, Household, HouseholdDraft, HouseholdId,
    HouseholdService, SignupRequest, SqliteHouseholdRepository, SqliteUserRepository,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/households", post(create_household))
        .route("/api/households/:id", get(get_household))
        .route("/api/households/:id/commit", post(commit_household))
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/send-comment-email", post(send_comment_email))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct CreateHouseholdBody {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SignupBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommitResponse {
    success: bool,
    members: usize,
    tasks: usize,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": hohm_core::core_version() }))
}

async fn create_household(
    State(state): State<AppState>,
    body: Result<Json<CreateHouseholdBody>, JsonRejection>,
) -> Result<Json<Household>, ApiError> {
    let Json(body) = body?;
    let household = state
        .with_conn(move |conn| {
            let service = HouseholdService::new(SqliteHouseholdRepository::new(conn));
            Ok(service.create_household(body.name.as_deref())?)
        })
        .await?;
    Ok(Json(household))
}

async fn get_household(
    State(state): State<AppState>,
    path: Result<Path<HouseholdId>, PathRejection>,
) -> Result<Json<Household>, ApiError> {
    let Path(id) = path?;
    let household = state
        .with_conn(move |conn| {
            let service = HouseholdService::new(SqliteHouseholdRepository::new(conn));
            Ok(service.get_household(id)?)
        })
        .await?;
    Ok(Json(household))
}

async fn commit_household(
    State(state): State<AppState>,
    path: Result<Path<HouseholdId>, PathRejection>,
    body: Result<Json<HouseholdDraft>, JsonRejection>,
) -> Result<Json<CommitResponse>, ApiError> {
    let Path(id) = path?;
    let Json(draft) = body?;
    let summary = state
        .with_conn(move |conn| {
            let service = HouseholdService::new(SqliteHouseholdRepository::new(conn));
            Ok(service.commit_draft(id, &draft)?)
        })
        .await?;
    Ok(Json(CommitResponse {
        success: true,
        members: summary.members,
        tasks: summary.tasks,
    }))
}

async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let request = SignupRequest {
        name: body.name,
        email: body.email,
        password: body.password,
    };
    let cost = state.password_cost();
    state
        .with_conn(move |conn| {
            let service = AccountService::with_hash_cost(SqliteUserRepository::new(conn), cost);
            Ok(service.signup(&request)?)
        })
        .await?;
    Ok(Json(json!({ "success": true })))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::Unauthorized(
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ));
    };
    let verified = state
        .with_conn(move |conn| {
            let service = AccountService::new(SqliteUserRepository::new(conn));
            Ok(service.verify_credentials(&email, &password)?)
        })
        .await?;
    if !verified {
        info!("event=login module=server status=rejected");
        return Err(ApiError::Unauthorized(
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ));
    }
    info!("event=login module=server status=ok");
    Ok(Json(json!({ "success": true })))
}

async fn send_comment_email(
    State(state): State<AppState>,
    body: Result<Json<CommentNotification>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let receipt = state
        .with_notify(move |notify| Ok(notify.send_comment_email(&request)?))
        .await?;
    Ok(Json(json!({ "success": true, "data": receipt.payload })))
}
