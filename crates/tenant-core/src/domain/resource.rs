//! Governed resource classes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::plan::{Limit, PlanLimits};
use crate::error::DomainError;

/// Every resource the quota layer governs. Each variant knows which plan
/// fields gate it, so adding a class forces the accessors below to be
/// extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Projects,
    Tasks,
    Teams,
    Members,
    Boards,
    CalendarEvents,
    Storage,
    AiRequests,
    Automations,
    Integrations,
    ApiRequests,
    Analytics,
    ChatMessages,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 13] = [
        ResourceClass::Projects,
        ResourceClass::Tasks,
        ResourceClass::Teams,
        ResourceClass::Members,
        ResourceClass::Boards,
        ResourceClass::CalendarEvents,
        ResourceClass::Storage,
        ResourceClass::AiRequests,
        ResourceClass::Automations,
        ResourceClass::Integrations,
        ResourceClass::ApiRequests,
        ResourceClass::Analytics,
        ResourceClass::ChatMessages,
    ];

    /// Resources reported in a usage snapshot.
    pub const METERED: [ResourceClass; 9] = [
        ResourceClass::Projects,
        ResourceClass::Tasks,
        ResourceClass::Teams,
        ResourceClass::Members,
        ResourceClass::Boards,
        ResourceClass::CalendarEvents,
        ResourceClass::Storage,
        ResourceClass::AiRequests,
        ResourceClass::ChatMessages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Projects => "projects",
            ResourceClass::Tasks => "tasks",
            ResourceClass::Teams => "teams",
            ResourceClass::Members => "members",
            ResourceClass::Boards => "boards",
            ResourceClass::CalendarEvents => "calendar_events",
            ResourceClass::Storage => "storage",
            ResourceClass::AiRequests => "ai_requests",
            ResourceClass::Automations => "automations",
            ResourceClass::Integrations => "integrations",
            ResourceClass::ApiRequests => "api_requests",
            ResourceClass::Analytics => "analytics",
            ResourceClass::ChatMessages => "chat_messages",
        }
    }

    /// Noun used in user-facing quota messages.
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceClass::Projects => "projects",
            ResourceClass::Tasks => "tasks",
            ResourceClass::Teams => "teams",
            ResourceClass::Members => "members",
            ResourceClass::Boards => "boards",
            ResourceClass::CalendarEvents => "calendar events",
            ResourceClass::Storage => "MB of storage",
            ResourceClass::AiRequests => "AI requests per month",
            ResourceClass::Automations => "automations",
            ResourceClass::Integrations => "integrations",
            ResourceClass::ApiRequests => "API requests per month",
            ResourceClass::Analytics => "analytics",
            ResourceClass::ChatMessages => "chat messages",
        }
    }

    pub fn feature_name(&self) -> &'static str {
        match self {
            ResourceClass::AiRequests => "AI features",
            ResourceClass::Automations => "Automations",
            ResourceClass::Integrations => "Integrations",
            ResourceClass::ApiRequests => "API access",
            ResourceClass::Analytics => "Analytics",
            _ => self.noun(),
        }
    }

    /// Numeric ceiling for this class. Flag-only features have no cap.
    pub fn limit(&self, limits: &PlanLimits) -> Limit {
        match self {
            ResourceClass::Projects => limits.max_projects,
            ResourceClass::Tasks => limits.max_tasks,
            ResourceClass::Teams => limits.max_teams,
            ResourceClass::Members => limits.max_members,
            ResourceClass::Boards => limits.max_boards,
            ResourceClass::CalendarEvents => limits.max_calendar_events,
            ResourceClass::Storage => limits.storage_mb,
            ResourceClass::AiRequests => limits.ai_requests_per_month,
            ResourceClass::Automations => limits.max_automations,
            ResourceClass::Integrations => limits.max_integrations,
            ResourceClass::ApiRequests => limits.api_requests_per_month,
            ResourceClass::Analytics => Limit::Unlimited,
            ResourceClass::ChatMessages => limits.max_chat_messages,
        }
    }

    /// Feature flag gating this class, if it is a gated feature family.
    pub fn feature_flag(&self, limits: &PlanLimits) -> Option<bool> {
        match self {
            ResourceClass::AiRequests => Some(limits.has_ai),
            ResourceClass::Automations => Some(limits.has_automation),
            ResourceClass::Integrations => Some(limits.has_integrations),
            ResourceClass::ApiRequests => Some(limits.has_api_access),
            ResourceClass::Analytics => Some(limits.has_analytics),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ResourceClass::ALL
            .into_iter()
            .find(|class| class.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidResource(s.to_string()))
    }
}
