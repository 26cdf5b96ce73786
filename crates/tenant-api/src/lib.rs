//! # Tenant API
//! 
//! HTTP surface: webhook ingestion, usage and quota endpoints, health
//! checks and the in-process event bus.

pub mod error;
pub mod events;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod security;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
