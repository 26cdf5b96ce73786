use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use tenant_core::domain::{BillingLogEntry, Plan, Workspace};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    pub plan: String,
}

/// POST /api/v1/workspaces
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateWorkspaceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Workspace>>), ApiError> {
    let Json(payload) = payload?;
    let workspace = state.workspaces.create_workspace(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(workspace))))
}

/// GET /api/v1/workspaces/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Workspace>>, ApiError> {
    let workspace = state.workspaces.get_workspace(&id).await?;
    Ok(Json(ApiResponse::success(workspace)))
}

/// PUT /api/v1/workspaces/{id}/plan
pub async fn change_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChangePlanRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Workspace>>, ApiError> {
    let Json(payload) = payload?;
    let plan: Plan = payload.plan.parse()?;
    let workspace = state.workspaces.change_plan(&id, plan).await?;
    Ok(Json(ApiResponse::success(workspace)))
}

/// GET /api/v1/workspaces/{id}/billing/history
pub async fn billing_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BillingLogEntry>>>, ApiError> {
    let entries = state.workspaces.billing_history(&id).await?;
    Ok(Json(ApiResponse::success(entries)))
}
