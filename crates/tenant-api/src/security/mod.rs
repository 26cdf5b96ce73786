//! Request authentication for inbound provider traffic

pub mod webhook_signature;

pub use webhook_signature::WebhookVerifier;
