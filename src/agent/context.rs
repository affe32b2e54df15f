//! System prompt assembly and history mapping.

use crate::providers::TranscriptEntry;
use crate::session::{Role, Turn};

/// Compose the system prompt for one exchange. The user context block changes
/// wording depending on whether the session is authenticated; a logged-in
/// user's id is pushed into the prompt so the model never asks for it.
pub fn build_system_prompt(user_id: Option<&str>, today: &str, tool_names: &[&str]) -> String {
    let user_context = match user_id {
        Some(id) => format!(
            "USER CONTEXT:\n\
             The user is currently logged in as user_id: {id}\n\n\
             Rules:\n\
             1. When the user asks about \"my orders\", \"my order\", \"return my laptop\", etc., \
             use the find_orders_by_user_id tool with user_id=\"{id}\".\n\
             2. Do not ask the user for their user id. You already have it.\n\
             3. Start personalized queries by finding their orders with find_orders_by_user_id(\"{id}\")."
        ),
        None => "USER CONTEXT:\n\
             The user is NOT logged in (anonymous session).\n\n\
             For personalized queries (orders, returns, refunds, warranty), politely ask them to \
             either log in or provide their user id manually, e.g. \"To check your orders, please \
             log in or provide your user ID (e.g., U001)\"."
            .to_string(),
    };

    format!(
        "You are an intelligent e-commerce support assistant for Antigravity Electronics.\n\n\
         {user_context}\n\n\
         Current context:\n\
         - Today's date: {today}\n\n\
         Your capabilities:\n\
         1. Track orders and shipments\n\
         2. Check return/refund eligibility\n\
         3. Verify warranty status\n\
         4. Recommend products\n\
         5. Troubleshoot device issues\n\
         6. Answer policy questions\n\n\
         Guidelines:\n\
         - Use the available tools to get accurate, real-time information\n\
         - Chain multiple tool calls when needed (e.g., find user orders, then check return eligibility)\n\
         - Be concise but helpful and friendly\n\
         - For complex issues beyond your tools, suggest escalation to the support team\n\n\
         Available tools: {}",
        tool_names.join(", ")
    )
}

/// Map stored history to transcript entries. System turns are operational
/// records and are not replayed to the model.
pub fn history_to_transcript(turns: &[Turn]) -> Vec<TranscriptEntry> {
    turns
        .iter()
        .filter_map(|turn| match turn.role {
            Role::User => Some(TranscriptEntry::user(turn.content.clone())),
            Role::Assistant => Some(TranscriptEntry::assistant(turn.content.clone())),
            Role::System => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_in_prompt_names_user() {
        let prompt = build_system_prompt(Some("U001"), "2026-01-15", &["get_order_status"]);
        assert!(prompt.contains("logged in as user_id: U001"));
        assert!(prompt.contains("find_orders_by_user_id(\"U001\")"));
        assert!(prompt.contains("Today's date: 2026-01-15"));
        assert!(prompt.contains("Available tools: get_order_status"));
    }

    #[test]
    fn test_anonymous_prompt() {
        let prompt = build_system_prompt(None, "2026-01-15", &[]);
        assert!(prompt.contains("NOT logged in"));
        assert!(!prompt.contains("logged in as user_id:"));
    }

    #[test]
    fn test_history_skips_system_turns() {
        let turns = vec![
            Turn::new("s1", Role::User, "hi", None, None),
            Turn::new("s1", Role::System, "note", None, None),
            Turn::new("s1", Role::Assistant, "hello", None, None),
        ];
        let transcript = history_to_transcript(&turns);
        assert_eq!(transcript.len(), 2);
        match &transcript[1] {
            TranscriptEntry::Message { role, content } => {
                assert_eq!(role, "assistant");
                assert_eq!(content, "hello");
            }
            _ => panic!("expected message"),
        }
    }
}
