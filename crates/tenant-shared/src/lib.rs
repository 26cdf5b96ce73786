//! # Tenant Shared
//! 
//! Configuration, telemetry, constants and small helpers shared by the
//! tenant governance crates.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
