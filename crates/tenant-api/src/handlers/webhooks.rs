// ============================================================================
// Tenant API - Billing Webhook Handler
// File: crates/tenant-api/src/handlers/webhooks.rs
// ============================================================================

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use tenant_core::domain::BillingProvider;
use tenant_core::services::{BatchReport, WebhookEnvelope};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /webhooks/{provider}
///
/// The signature is checked against the raw bytes before anything is
/// parsed. Once verified, per-event failures only show up in the report.
pub async fn receive(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let provider = match provider.parse::<BillingProvider>() {
        Ok(BillingProvider::None) | Err(_) => {
            return Err(ApiError::NotFound(format!("Unknown billing provider: {}", provider)))
        }
        Ok(provider) => provider,
    };

    state.verifier.verify(provider, &headers, &body)?;

    let envelope: WebhookEnvelope = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {}", e)))?;
    let events = envelope.into_events();
    info!(provider = provider.as_str(), events = events.len(), "Webhook received");

    let report = state.billing.process_batch(provider, events).await;
    Ok(Json(ApiResponse::success(report)))
}
