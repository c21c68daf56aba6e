//! HTTP Handlers
//!
//! Thin adapters: extract, call one application service, shape the reply.

use crate::auth::{AuthUser, MaybeUser};
use crate::error::ApiError;
use crate::rate_limiter::RateLimiter;
use crate::types::{
    AddKnownRequest, ArchiveParams, DepartureResponse, HealthResponse, JoinResponse,
    ListQueuesParams, ServiceTimeRequest,
};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dontq_core::application::{
    CatalogService, CreateQueueRequest, ProfileService, ProfileUpdate, QueueManagement,
    QueueView, RosterService,
};
use dontq_core::domain::{ArchivedEntry, Queue, UserProfile};
use std::sync::Arc;
use tracing::info;

type ApiResult<T> = Result<T, ApiError>;

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<CatalogService>,
    pub roster: Arc<RosterService>,
    pub profiles: Arc<ProfileService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl ApiState {
    pub fn new(catalog: CatalogService, roster: RosterService, profiles: ProfileService) -> Self {
        Self {
            catalog: Arc::new(catalog),
            roster: Arc::new(roster),
            profiles: Arc::new(profiles),
            rate_limiter: Arc::new(RateLimiter::default()),
        }
    }

    pub fn with_rate_limit(mut self, burst: u32, per_second: u32) -> Self {
        self.rate_limiter = Arc::new(RateLimiter::new(burst, per_second));
        self
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: dontq_core::VERSION,
    })
}

pub async fn list_queues(
    State(state): State<ApiState>,
    params: Result<Query<ListQueuesParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Queue>>> {
    let Query(params) = params?;
    let queues = state.catalog.list(&params.into()).await?;
    Ok(Json(queues))
}

pub async fn create_queue(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateQueueRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Queue>)> {
    let Json(req) = payload?;
    let queue = state.catalog.create(&user_id, req).await?;
    Ok((StatusCode::CREATED, Json(queue)))
}

pub async fn find_by_short_id(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Queue>> {
    let Path(short_id) = path?;
    Ok(Json(state.catalog.find_by_short_id(&short_id).await?))
}

pub async fn view_queue(
    State(state): State<ApiState>,
    MaybeUser(caller): MaybeUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<QueueView>> {
    let Path(queue_id) = path?;
    Ok(Json(state.catalog.view(&queue_id, caller.as_deref()).await?))
}

pub async fn manage_queue(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<QueueManagement>> {
    let Path(queue_id) = path?;
    Ok(Json(state.catalog.manage(&queue_id, &user_id).await?))
}

pub async fn queue_archive(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<ArchiveParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ArchivedEntry>>> {
    let Path(queue_id) = path?;
    let Query(params) = params?;
    let rows = state
        .catalog
        .archive(&queue_id, &user_id, params.limit)
        .await?;
    Ok(Json(rows))
}

pub async fn update_service_time(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ServiceTimeRequest>, JsonRejection>,
) -> ApiResult<Json<Queue>> {
    let Path(queue_id) = path?;
    let Json(req) = payload?;
    let queue = state
        .roster
        .update_service_time(&queue_id, &user_id, req.est_time_to_serve)
        .await?;
    Ok(Json(queue))
}

pub async fn join_queue(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<JoinResponse>> {
    let Path(queue_id) = path?;
    let outcome = state.roster.join(&queue_id, &user_id).await?;
    Ok(Json(outcome.into()))
}

pub async fn leave_queue(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DepartureResponse>> {
    let Path(queue_id) = path?;
    let outcome = state.roster.leave(&queue_id, &user_id).await?;
    Ok(Json(outcome.into()))
}

pub async fn add_known(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<AddKnownRequest>, JsonRejection>,
) -> ApiResult<Json<JoinResponse>> {
    let Path(queue_id) = path?;
    let Json(req) = payload?;
    let outcome = state
        .roster
        .add_known(&queue_id, &user_id, &req.short_id)
        .await?;
    info!(
        queue_id = %queue_id,
        operator = %user_id,
        user_id = %outcome.entry.user_id,
        "Known user added by operator"
    );
    Ok(Json(outcome.into()))
}

pub async fn mark_no_show(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Json<DepartureResponse>> {
    let Path((queue_id, entry_id)) = path?;
    let outcome = state.roster.no_show(&queue_id, &entry_id, &user_id).await?;
    Ok(Json(outcome.into()))
}

pub async fn mark_served(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Json<DepartureResponse>> {
    let Path((queue_id, entry_id)) = path?;
    let outcome = state.roster.serve(&queue_id, &entry_id, &user_id).await?;
    Ok(Json(outcome.into()))
}

pub async fn get_profile(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.profiles.get_profile(&user_id).await?))
}

pub async fn put_profile(
    State(state): State<ApiState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let Json(update) = payload?;
    Ok(Json(state.profiles.upsert_profile(&user_id, update).await?))
}
