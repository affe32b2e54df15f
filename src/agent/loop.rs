//! The conversation loop.
//!
//! One `handle_turn` call takes a screened user message through intent
//! routing, the bounded model/tool exchange, and persistence, and always
//! comes back with an answer. Model, tool, and retrieval failures degrade to
//! fallback answers inside the loop; only storage errors propagate.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::AgentConfig;
use crate::error::{OrbitError, Result};
use crate::intent::{detect_intent, Intent};
use crate::providers::{ModelClient, ModelTurn, TranscriptEntry};
use crate::rag::RagService;
use crate::session::{ConversationStore, Role};
use crate::tools::{ToolRegistry, DATE_DEPENDENT_TOOLS};

use super::context::{build_system_prompt, history_to_transcript};

pub const ROUTE_CHITCHAT: &str = "builtin:chitchat";
pub const ROUTE_DATE: &str = "builtin:date";
pub const ROUTE_AUTH_REQUIRED: &str = "auth_required";
pub const ROUTE_AGENTIC: &str = "agentic";
pub const ROUTE_FALLBACK_RETRIEVAL: &str = "fallback_retrieval";
pub const ROUTE_FALLBACK_UNAVAILABLE: &str = "fallback_unavailable";
pub const ROUTE_BLOCKED: &str = "blocked";

const AUTH_REQUIRED_ANSWER: &str = "To help with your order, return, refund, or warranty query, \
     I need to identify you. You can either:\n\
     1. Log in to your account, OR\n\
     2. Provide your User ID (e.g., U001, U002)\n\n\
     If you don't know your User ID, you can ask me to look it up by email.";

const UNAVAILABLE_ANSWER: &str = "I'm having trouble answering that right now. \
     Please try again in a moment or rephrase your question.";

/// One tool invocation made during an exchange, as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub arguments: Value,
    pub result: Value,
    /// Which model call requested this invocation (1-based).
    pub iteration_index: u32,
}

/// The result of handling one user message.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    pub intent: String,
    pub route: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model calls made. Zero for short-circuit routes.
    pub iterations: u32,
}

pub struct ConversationLoop {
    store: Arc<dyn ConversationStore>,
    model: Arc<dyn ModelClient>,
    tools: Arc<ToolRegistry>,
    rag: Arc<RagService>,
    history_window: usize,
    max_iterations: u32,
    retrieval_top_k: usize,
    call_timeout: Duration,
}

impl ConversationLoop {
    pub fn new(
        config: &AgentConfig,
        store: Arc<dyn ConversationStore>,
        model: Arc<dyn ModelClient>,
        tools: Arc<ToolRegistry>,
        rag: Arc<RagService>,
    ) -> Self {
        Self {
            store,
            model,
            tools,
            rag,
            history_window: config.history_window,
            max_iterations: config.max_iterations,
            retrieval_top_k: config.retrieval_top_k,
            call_timeout: Duration::from_secs(config.call_timeout_secs),
        }
    }

    /// Handle one screened user message end to end.
    pub async fn handle_turn(&self, session_id: &str, message: &str) -> Result<TurnOutcome> {
        let session = self.store.get_or_create_session(session_id).await?;
        let user_id = if session.active { session.user_id } else { None };

        let router_info = detect_intent(message);
        let intent = router_info.intent;

        // History is read before this message is appended so the transcript
        // carries the current message exactly once.
        let history = self
            .store
            .get_recent_turns(session_id, self.history_window)
            .await?;
        self.store
            .append_turn(session_id, Role::User, message, Some(intent.as_str()), None)
            .await?;

        let today = Utc::now().format("%Y-%m-%d").to_string();

        if intent == Intent::Chitchat {
            let answer = chitchat_answer(message);
            return self
                .finish(session_id, intent, ROUTE_CHITCHAT, answer, Vec::new(), 0)
                .await;
        }

        if intent == Intent::DateQuery {
            let answer = format!("Today's date is {today}.");
            return self
                .finish(session_id, intent, ROUTE_DATE, answer, Vec::new(), 0)
                .await;
        }

        if intent.is_private() && user_id.is_none() {
            return self
                .finish(
                    session_id,
                    intent,
                    ROUTE_AUTH_REQUIRED,
                    AUTH_REQUIRED_ANSWER.to_string(),
                    Vec::new(),
                    0,
                )
                .await;
        }

        self.run_exchange(session_id, message, intent, user_id.as_deref(), &history, &today)
            .await
    }

    /// The bounded model/tool exchange, ending in a final answer or the
    /// retrieval fallback.
    async fn run_exchange(
        &self,
        session_id: &str,
        message: &str,
        intent: Intent,
        user_id: Option<&str>,
        history: &[crate::session::Turn],
        today: &str,
    ) -> Result<TurnOutcome> {
        let system_prompt = build_system_prompt(user_id, today, &self.tools.names());
        let declarations = self.tools.declarations();

        let mut transcript = history_to_transcript(history);
        transcript.push(TranscriptEntry::user(message));

        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut iterations: u32 = 0;

        while iterations < self.max_iterations {
            iterations += 1;

            let turn = match timeout(
                self.call_timeout,
                self.model.converse(&system_prompt, &declarations, &transcript),
            )
            .await
            {
                Ok(Ok(turn)) => turn,
                Ok(Err(err)) => {
                    error!(session = %session_id, iteration = iterations, error = %err, "model call failed");
                    return self
                        .fallback(session_id, message, intent, tool_calls, iterations)
                        .await;
                }
                Err(_) => {
                    warn!(session = %session_id, iteration = iterations, "model call timed out");
                    return self
                        .fallback(session_id, message, intent, tool_calls, iterations)
                        .await;
                }
            };

            match turn {
                ModelTurn::FinalAnswer(answer) => {
                    return self
                        .finish(session_id, intent, ROUTE_AGENTIC, answer, tool_calls, iterations)
                        .await;
                }
                ModelTurn::ToolRequest { name, mut arguments } => {
                    inject_today(&name, &mut arguments, today);

                    let result =
                        match timeout(self.call_timeout, self.tools.invoke(&name, arguments.clone()))
                            .await
                        {
                            Ok(Ok(result)) => result,
                            Ok(Err(err @ OrbitError::UnknownTool(_)))
                            | Ok(Err(err @ OrbitError::InvalidArguments { .. })) => {
                                // Feed the rejection back so the model can
                                // correct itself on the next iteration.
                                warn!(session = %session_id, tool = %name, error = %err, "tool call rejected");
                                json!({"error": err.to_string()})
                            }
                            Ok(Err(err)) => {
                                error!(session = %session_id, tool = %name, error = %err, "tool failed");
                                json!({"error": err.to_string()})
                            }
                            Err(_) => {
                                warn!(session = %session_id, tool = %name, "tool call timed out");
                                tool_calls.push(ToolCallRecord {
                                    tool_name: name,
                                    arguments,
                                    result: json!({"error": "tool call timed out"}),
                                    iteration_index: iterations,
                                });
                                return self
                                    .fallback(session_id, message, intent, tool_calls, iterations)
                                    .await;
                            }
                        };

                    tool_calls.push(ToolCallRecord {
                        tool_name: name.clone(),
                        arguments: arguments.clone(),
                        result: result.clone(),
                        iteration_index: iterations,
                    });

                    transcript.push(TranscriptEntry::ToolCall { name: name.clone(), arguments });
                    transcript.push(TranscriptEntry::ToolResult { name, result });
                }
            }
        }

        warn!(session = %session_id, iterations, "iteration cap reached");
        self.fallback(session_id, message, intent, tool_calls, iterations)
            .await
    }

    /// Single-shot retrieval-grounded answer. Never re-enters the exchange;
    /// if retrieval itself fails the user gets a generic apology.
    async fn fallback(
        &self,
        session_id: &str,
        message: &str,
        intent: Intent,
        tool_calls: Vec<ToolCallRecord>,
        iterations: u32,
    ) -> Result<TurnOutcome> {
        let answered = timeout(
            self.call_timeout,
            self.rag.answer(message, self.retrieval_top_k),
        )
        .await;

        let (answer, route) = match answered {
            Ok(Ok(rag)) => (rag.answer, ROUTE_FALLBACK_RETRIEVAL),
            Ok(Err(err)) => {
                error!(session = %session_id, error = %err, "retrieval fallback failed");
                (UNAVAILABLE_ANSWER.to_string(), ROUTE_FALLBACK_UNAVAILABLE)
            }
            Err(_) => {
                warn!(session = %session_id, "retrieval fallback timed out");
                (UNAVAILABLE_ANSWER.to_string(), ROUTE_FALLBACK_UNAVAILABLE)
            }
        };

        self.finish(session_id, intent, route, answer, tool_calls, iterations)
            .await
    }

    /// Persist the assistant turn and assemble the outcome.
    async fn finish(
        &self,
        session_id: &str,
        intent: Intent,
        route: &str,
        answer: String,
        tool_calls: Vec<ToolCallRecord>,
        iterations: u32,
    ) -> Result<TurnOutcome> {
        self.store
            .append_turn(
                session_id,
                Role::Assistant,
                &answer,
                Some(intent.as_str()),
                Some(route),
            )
            .await?;

        info!(
            session = %session_id,
            intent = intent.as_str(),
            route,
            iterations,
            tool_calls = tool_calls.len(),
            "turn handled"
        );

        Ok(TurnOutcome {
            answer,
            intent: intent.as_str().to_string(),
            route: route.to_string(),
            tool_calls,
            iterations,
        })
    }
}

/// Date-dependent tools get today's date injected when the model omits it.
fn inject_today(name: &str, arguments: &mut Value, today: &str) {
    if !DATE_DEPENDENT_TOOLS.contains(&name) {
        return;
    }
    if let Some(obj) = arguments.as_object_mut() {
        if !obj.contains_key("today") || obj["today"].is_null() {
            obj.insert("today".to_string(), Value::String(today.to_string()));
        }
    }
}

fn chitchat_answer(message: &str) -> String {
    let lowered = message.trim().to_lowercase();

    if lowered.contains("how are you") || lowered.contains("how r you") {
        "I'm doing great and ready to help you! How can I assist you today?".to_string()
    } else if lowered.contains("who are you") {
        "I'm an AI assistant for Antigravity Electronics. I can help with orders, returns, \
         refunds, warranty, product recommendations, and troubleshooting."
            .to_string()
    } else if lowered.contains("what can you do") {
        "I can help you:\n\
         - Track orders and check delivery status\n\
         - Check return and refund eligibility\n\
         - Look up warranty information\n\
         - Suggest products based on your needs\n\
         - Assist with device troubleshooting\n\
         - Answer questions about our policies"
            .to_string()
    } else if lowered.contains("thank") {
        "You're welcome! Feel free to ask if you need anything else.".to_string()
    } else {
        "Hi! I'm here to help with orders, products, returns, refunds, and more. \
         What can I do for you?"
            .to_string()
    }
}
