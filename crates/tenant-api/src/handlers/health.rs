use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use tenant_infrastructure::shard::ShardStatus;
use tenant_shared::constants::PRIMARY_SHARD;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: String,
    shards: Vec<ShardStatus>,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Ready while the primary shard answers; a down secondary only degrades.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let shards = state.readiness.probe().await;

    let primary_up = shards.iter().any(|s| s.shard == PRIMARY_SHARD && s.healthy);
    let all_up = shards.iter().all(|s| s.healthy);

    let (code, status) = match (primary_up, all_up) {
        (true, true) => (StatusCode::OK, "ready"),
        (true, false) => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    (
        code,
        Json(ReadinessResponse {
            status: status.to_string(),
            shards,
        }),
    )
}
