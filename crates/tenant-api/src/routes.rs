use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handlers::{events, health, usage, webhooks, workspaces};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/workspaces", post(workspaces::create))
        .route("/workspaces/{id}", get(workspaces::get))
        .route("/workspaces/{id}/plan", put(workspaces::change_plan))
        .route("/workspaces/{id}/billing/history", get(workspaces::billing_history))
        .route("/workspaces/{id}/usage", get(usage::snapshot))
        .route("/workspaces/{id}/quota/check", post(usage::check_quota))
        .route("/workspaces/{id}/uploads/check", post(usage::check_upload))
        .route("/workspaces/{id}/activities/uploads", post(usage::record_upload))
        .route("/workspaces/{id}/activities/ai", post(usage::record_ai_generation))
        .route("/workspaces/{id}/events", get(events::stream));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        // Provider webhooks
        .route("/webhooks/{provider}", post(webhooks::receive))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
}
