//! Caller identity, supplied by the session collaborator.
//!
//! Authentication itself lives upstream; this module only models the role
//! and display name the session layer hands over with each call.

use serde::{Deserialize, Serialize};

/// Session role. Each workflow step is owned by exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    LabIncharge,
    LabAssistant,
}

impl Role {
    /// Parse from string. Unknown roles are rejected, not defaulted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "lab_incharge" | "incharge" => Some(Self::LabIncharge),
            "lab_assistant" | "assistant" => Some(Self::LabAssistant),
            _ => None,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::LabIncharge => "lab_incharge",
            Self::LabAssistant => "lab_assistant",
        }
    }

    /// Human-readable name for rendered views.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::LabIncharge => "Lab In-charge",
            Self::LabAssistant => "Lab Assistant",
        }
    }
}

/// The identity attached to a call: role plus display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub name: String,
}

impl Session {
    pub fn new(role: Role, name: impl Into<String>) -> Self {
        Self { role, name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Lab_Incharge"), Some(Role::LabIncharge));
        assert_eq!(Role::parse(" assistant "), Some(Role::LabAssistant));
    }

    #[test]
    fn test_parse_unknown_role_rejected() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }
}
