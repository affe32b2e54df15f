//! Rule-based content filtering applied before any model or tool call.
//!
//! Deliberately lightweight: a keyword scan, not a full safety system. The
//! domain check stays soft so short valid queries like bare product names
//! are never rejected.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;

const BLOCKED_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "harm myself",
    "bomb",
    "terrorist",
    "gun",
    "weapon",
];

const SAFETY_MESSAGE: &str = "I'm not able to help with that topic. \
     If you are in distress or feel unsafe, please reach out to trusted people around you \
     or contact local emergency services or a helpline.";

const EMPTY_MESSAGE: &str = "Please enter a question related to your orders, products, \
     returns, refunds, or warranty.";

/// Why a message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardReason {
    Empty,
    Safety,
}

impl GuardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardReason::Empty => "empty",
            GuardReason::Safety => "safety",
        }
    }
}

/// The filter's decision for one message.
#[derive(Debug, Clone)]
pub struct GuardVerdict {
    pub allowed: bool,
    pub reason: Option<GuardReason>,
    /// User-facing replacement answer when `allowed` is false.
    pub message: Option<String>,
}

impl GuardVerdict {
    fn pass() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    fn reject(reason: GuardReason, message: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message: Some(message.to_string()),
        }
    }
}

// Static pattern set; construction cannot fail.
static BLOCKED_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(BLOCKED_KEYWORDS)
        .expect("static keyword patterns")
});

pub struct ContentFilter {
    blocked: &'static AhoCorasick,
}

impl ContentFilter {
    pub fn new() -> Self {
        Self {
            blocked: &BLOCKED_MATCHER,
        }
    }

    /// Screen one incoming message. Rejections carry the canned reply to
    /// return in place of an answer.
    pub fn check(&self, message: &str) -> GuardVerdict {
        let text = message.trim();

        if text.is_empty() {
            return GuardVerdict::reject(GuardReason::Empty, EMPTY_MESSAGE);
        }

        if let Some(hit) = self.blocked.find(text) {
            warn!(pattern = BLOCKED_KEYWORDS[hit.pattern().as_usize()], "message blocked");
            return GuardVerdict::reject(GuardReason::Safety, SAFETY_MESSAGE);
        }

        GuardVerdict::pass()
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new()
    }
}
