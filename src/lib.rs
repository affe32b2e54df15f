//! OrbitDesk — agentic e-commerce customer support backend.
//!
//! A chat backend that routes each customer message through rule-based
//! intent detection, then either answers it directly (small talk, date
//! queries, login prompts) or runs a bounded exchange with a
//! function-calling model that can invoke deterministic support tools
//! (orders, returns, refunds, warranty, products, troubleshooting, policy
//! search). When the model cannot produce an answer, a keyword-retrieval
//! fallback over the policy documents takes over.
//!
//! Module map:
//! - [`agent`] — the conversation loop and system prompt assembly
//! - [`tools`] — the tool trait, registry, and built-in support tools
//! - [`providers`] — the model client boundary and the Gemini implementation
//! - [`rag`] — keyword retrieval index and grounded answering
//! - [`session`] — conversation persistence
//! - [`catalog`] — structured orders/products/troubleshooting data
//! - [`intent`] — rule-based intent router
//! - [`guard`] — pre-model content filtering
//! - [`auth`] — user accounts and login
//! - [`gateway`] — the HTTP surface

pub mod agent;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod intent;
pub mod providers;
pub mod rag;
pub mod session;
pub mod tools;

pub use error::{OrbitError, Result};
