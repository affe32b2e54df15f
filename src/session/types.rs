//! Session and turn types.
//!
//! A `Session` binds a conversation to an (optional) authenticated user; a
//! `Turn` is one immutable entry in the session's ordered history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The author of a persisted turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Messages from the customer.
    User,
    /// Messages from the assistant (including short-circuit and fallback answers).
    Assistant,
    /// Operational notes injected by the backend.
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

/// A client-scoped conversation context, optionally bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique identifier (UUID v4 for generated sessions).
    pub id: String,
    /// Attached on login or manual identification; never removed.
    pub user_id: Option<String>,
    /// Set false on logout. Inactive sessions resolve as anonymous.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    /// Create a new active session with the given id.
    pub fn new(id: &str, user_id: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            user_id: user_id.map(str::to_string),
            active: true,
            created_at: now,
            last_active: now,
        }
    }

    /// Generate a fresh session with a random id.
    pub fn generate(user_id: Option<&str>) -> Self {
        Self::new(&uuid::Uuid::new_v4().to_string(), user_id)
    }
}

/// One persisted message in a session's history. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Detected intent tag, when known at write time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Which path produced this turn (e.g. "agentic", "auth_required").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(
        session_id: &str,
        role: Role,
        content: &str,
        intent: Option<&str>,
        route: Option<&str>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            intent: intent.map(str::to_string),
            route: route.map(str::to_string),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new("s1", None);
        assert_eq!(session.id, "s1");
        assert!(session.user_id.is_none());
        assert!(session.active);
    }

    #[test]
    fn test_session_generate_unique() {
        let a = Session::generate(Some("U001"));
        let b = Session::generate(Some("U001"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.user_id.as_deref(), Some("U001"));
    }

    #[test]
    fn test_role_serialize() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        let parsed: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(parsed, Role::Assistant);
    }

    #[test]
    fn test_turn_skips_none_fields() {
        let turn = Turn::new("s1", Role::User, "hi", None, None);
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("intent"));
        assert!(!json.contains("route"));
    }

    #[test]
    fn test_turn_roundtrip() {
        let turn = Turn::new("s1", Role::Assistant, "hello", Some("chitchat"), Some("builtin:chitchat"));
        let json = serde_json::to_string(&turn).unwrap();
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.role, Role::Assistant);
        assert_eq!(parsed.intent.as_deref(), Some("chitchat"));
        assert_eq!(parsed.route.as_deref(), Some("builtin:chitchat"));
    }
}
