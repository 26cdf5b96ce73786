// ============================================================================
// Tenant API - Usage & Quota Handlers
// File: crates/tenant-api/src/handlers/usage.rs
// ============================================================================
//! Usage snapshots, pre-create quota checks and activity recording

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use tenant_core::domain::{ActivityRecord, ResourceClass, UploadResult, UsageSnapshot};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuotaCheckRequest {
    pub resource: String,
}

#[derive(Debug, Serialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub resource: ResourceClass,
    pub current: u64,
}

#[derive(Debug, Deserialize)]
pub struct UploadCheckRequest {
    pub size_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct AiGenerationRequest {
    pub feature: String,
}

/// GET /api/v1/workspaces/{id}/usage
pub async fn snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UsageSnapshot>>, ApiError> {
    let snapshot = state.usage.usage_for(&id).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// POST /api/v1/workspaces/{id}/quota/check
///
/// Answers 200 when one more `resource` may be created, otherwise the
/// enforcement error (403 quota, 402 billing).
pub async fn check_quota(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<QuotaCheckRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<QuotaDecision>>, ApiError> {
    let Json(payload) = payload?;
    let resource: ResourceClass = payload.resource.parse()?;
    let current = state.quota.ensure_can_create(&id, resource).await?;

    Ok(Json(ApiResponse::success(QuotaDecision {
        allowed: true,
        resource,
        current,
    })))
}

/// POST /api/v1/workspaces/{id}/uploads/check
///
/// `current` is the stored MB before this upload.
pub async fn check_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UploadCheckRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<QuotaDecision>>, ApiError> {
    let Json(payload) = payload?;
    let current = state.quota.ensure_can_upload(&id, payload.size_bytes).await?;

    Ok(Json(ApiResponse::success(QuotaDecision {
        allowed: true,
        resource: ResourceClass::Storage,
        current,
    })))
}

/// POST /api/v1/workspaces/{id}/activities/uploads
///
/// Called after the object store accepted the file.
pub async fn record_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UploadResult>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ActivityRecord>>), ApiError> {
    let Json(upload) = payload?;
    state.workspaces.get_workspace(&id).await?;
    let record = state.activities.record_upload(&id, &upload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// POST /api/v1/workspaces/{id}/activities/ai
pub async fn record_ai_generation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AiGenerationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ActivityRecord>>), ApiError> {
    let Json(payload) = payload?;
    state.quota.ensure_can_create(&id, ResourceClass::AiRequests).await?;
    let record = state.activities.record_ai_generation(&id, &payload.feature).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}
