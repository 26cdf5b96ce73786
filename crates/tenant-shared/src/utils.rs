//! Utility functions

use crate::constants::WORKSPACE_CHANNEL_PREFIX;

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        match local.chars().count() {
            0 => format!("***{}", domain),
            1 | 2 => format!("{}***{}", local.chars().next().unwrap_or('*'), domain),
            _ => format!("{}***{}", local.chars().take(2).collect::<String>(), domain),
        }
    } else {
        "***".to_string()
    }
}

/// Pub/sub channel carrying events for one workspace.
pub fn workspace_channel(workspace_id: &str) -> String {
    format!("{}{}", WORKSPACE_CHANNEL_PREFIX, workspace_id)
}
