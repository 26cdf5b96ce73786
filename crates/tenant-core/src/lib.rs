//! # Tenant Core
//! 
//! Domain entities, repository ports and the governance services: plan
//! catalog, usage aggregation, quota enforcement and the billing state
//! machine.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
