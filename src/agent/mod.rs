//! Conversation handling: prompt assembly and the model/tool exchange loop.

mod context;
mod r#loop;

pub use context::{build_system_prompt, history_to_transcript};
pub use r#loop::{
    ConversationLoop, ToolCallRecord, TurnOutcome, ROUTE_AGENTIC, ROUTE_AUTH_REQUIRED,
    ROUTE_BLOCKED, ROUTE_CHITCHAT, ROUTE_DATE, ROUTE_FALLBACK_RETRIEVAL,
    ROUTE_FALLBACK_UNAVAILABLE,
};
