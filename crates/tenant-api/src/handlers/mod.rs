pub mod events;
pub mod health;
pub mod usage;
pub mod webhooks;
pub mod workspaces;
