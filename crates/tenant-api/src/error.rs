// ============================================================================
// Tenant API - Error Mapping
// File: crates/tenant-api/src/error.rs
// ============================================================================

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use tenant_core::domain::ResourceClass;
use tenant_core::error::DomainError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Quota exceeded for {resource}: {message}")]
    QuotaExceeded { resource: ResourceClass, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        if err.is_enforcement() {
            tracing::info!("Request denied: {}", err);
        }
        match err {
            DomainError::TenantNotFound(id) => ApiError::NotFound(format!("Workspace not found: {}", id)),
            e @ DomainError::BillingDeactivated { .. } => ApiError::PaymentRequired(e.to_string()),
            DomainError::QuotaExceeded { resource, message } => ApiError::QuotaExceeded { resource, message },
            DomainError::ShardUnavailable { shard, reason } => {
                tracing::error!(shard, "Shard unavailable: {}", reason);
                ApiError::ServiceUnavailable
            }
            DomainError::WebhookVerificationFailed(msg) => ApiError::Unauthorized(msg),
            DomainError::ValidationError(msg)
            | DomainError::InvalidPlan(msg)
            | DomainError::InvalidResource(msg) => ApiError::BadRequest(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, ApiResponse::<()>::error("NOT_FOUND", &msg))
            }
            ApiError::PaymentRequired(msg) => {
                tracing::info!("Billing deactivated: {}", msg);
                (StatusCode::PAYMENT_REQUIRED, ApiResponse::<()>::error("BILLING_DEACTIVATED", &msg))
            }
            ApiError::QuotaExceeded { resource, message } => (
                StatusCode::FORBIDDEN,
                ApiResponse::<()>::error("QUOTA_EXCEEDED", &message).with_resource(resource.as_str()),
            ),
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, ApiResponse::<()>::error("UNAUTHORIZED", &msg))
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ApiResponse::<()>::error("BAD_REQUEST", &msg))
            }
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::<()>::error(
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable, try again shortly",
                ),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error("INTERNAL_ERROR", "Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(status_of(DomainError::TenantNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DomainError::BillingDeactivated { workspace_id: "x".into() }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(DomainError::QuotaExceeded {
                resource: ResourceClass::Projects,
                message: "full".into()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::ShardUnavailable { shard: 3, reason: "refused".into() }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DomainError::WebhookVerificationFailed("bad".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(DomainError::InvalidPlan("gold".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::DatabaseError("syntax".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
