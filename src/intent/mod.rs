//! Rule-based intent detection and slot extraction.
//!
//! Runs before the model is involved. Rule order matters: device issues are
//! checked before chitchat so "great, my laptop is not working" is not
//! misread as small talk.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ORDER_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Static pattern; cannot fail.
    Regex::new(r"(?i)\bORD\d+\b").expect("static order id pattern")
});

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("static number pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Troubleshooting,
    Chitchat,
    DateQuery,
    OrderStatus,
    PolicyQuestion,
    Refund,
    ReturnEligibility,
    WarrantyStatus,
    ProductSearch,
    GeneralRag,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Troubleshooting => "troubleshooting",
            Intent::Chitchat => "chitchat",
            Intent::DateQuery => "date_query",
            Intent::OrderStatus => "order_status",
            Intent::PolicyQuestion => "policy_question",
            Intent::Refund => "refund",
            Intent::ReturnEligibility => "return_eligibility",
            Intent::WarrantyStatus => "warranty_status",
            Intent::ProductSearch => "product_search",
            Intent::GeneralRag => "general_rag",
        }
    }

    /// Intents that expose account data and therefore require a logged-in
    /// user.
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            Intent::OrderStatus
                | Intent::ReturnEligibility
                | Intent::Refund
                | Intent::WarrantyStatus
        )
    }
}

/// Detected intent plus the slots extracted alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct RouterInfo {
    pub intent: Intent,
    pub order_id: Option<String>,
    pub category: Option<String>,
    pub max_price: Option<f64>,
}

impl RouterInfo {
    fn bare(intent: Intent) -> Self {
        Self {
            intent,
            order_id: None,
            category: None,
            max_price: None,
        }
    }
}

pub fn extract_order_id(text: &str) -> Option<String> {
    ORDER_ID_PATTERN
        .find(text)
        .map(|m| m.as_str().to_uppercase())
}

/// Heuristic price cap extraction: a number shortly after "under", "below"
/// and similar markers.
pub fn extract_max_price(text: &str) -> Option<f64> {
    let lowered = text.to_lowercase();
    for kw in ["under", "below", "less than", "<", "upto", "up to"] {
        if let Some(idx) = lowered.find(kw) {
            let window_end = (idx + 30).min(lowered.len());
            // Clamp to a char boundary so slicing stays valid.
            let window_end = (0..=window_end)
                .rev()
                .find(|&i| lowered.is_char_boundary(i))
                .unwrap_or(idx);
            let window = &lowered[idx..window_end];
            if let Some(m) = NUMBER_PATTERN.find(window) {
                if let Ok(value) = m.as_str().parse::<f64>() {
                    return Some(value);
                }
            }
        }
    }
    None
}

pub fn detect_category(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let category = if lowered.contains("laptop") {
        "laptop"
    } else if lowered.contains("headphone") || lowered.contains("headset") {
        "headphones"
    } else if lowered.contains("mouse") || lowered.contains("mice") {
        "mouse"
    } else if lowered.contains("keyboard") || lowered.contains("key board") {
        "keyboard"
    } else if lowered.contains("phone") || lowered.contains("mobile") || lowered.contains("smartphone")
    {
        "phone"
    } else {
        return None;
    };
    Some(category.to_string())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn is_chitchat(lowered: &str) -> bool {
    // Leading space on " hi" and " hey" avoids matching "this" / "they".
    contains_any(
        lowered,
        &[
            " hi",
            "hello",
            " hey",
            "how are you",
            "how r you",
            "who are you",
            "what can you do",
            "thanks",
            "thank you",
            "good morning",
            "good evening",
        ],
    ) || lowered == "hi"
        || lowered == "hey"
}

fn is_troubleshooting_issue(lowered: &str) -> bool {
    contains_any(
        lowered,
        &[
            "not turning on",
            "won't turn on",
            "does not turn on",
            "doesn't turn on",
            "won't power on",
            "no sound",
            "not working",
            "stopped working",
            "stop working",
            "broken",
            "issue with",
            "problem with",
            "overheating",
        ],
    )
}

/// Classify one user message and pull out its slots.
pub fn detect_intent(user_message: &str) -> RouterInfo {
    let text = user_message.trim();
    let lowered = text.to_lowercase();

    if is_troubleshooting_issue(&lowered) {
        return RouterInfo {
            intent: Intent::Troubleshooting,
            order_id: extract_order_id(text),
            category: detect_category(text),
            max_price: extract_max_price(text),
        };
    }

    if is_chitchat(&lowered) {
        return RouterInfo::bare(Intent::Chitchat);
    }

    if contains_any(
        &lowered,
        &["date today", "today's date", "what day is it"],
    ) {
        return RouterInfo::bare(Intent::DateQuery);
    }

    let order_id = extract_order_id(text);
    let category = detect_category(text);
    let max_price = extract_max_price(text);
    let slots = |intent| RouterInfo {
        intent,
        order_id: order_id.clone(),
        category: category.clone(),
        max_price,
    };

    if lowered.contains("where is my order")
        || lowered.contains("track my order")
        || (lowered.contains("order") && lowered.contains("status"))
        || (lowered.contains("order") && lowered.contains("tracking"))
        || (order_id.is_some() && lowered.contains("status"))
    {
        return slots(Intent::OrderStatus);
    }

    if lowered.contains("policy") {
        return slots(Intent::PolicyQuestion);
    }

    if contains_any(&lowered, &["refund", "money back", "get my money"]) {
        return slots(Intent::Refund);
    }

    if contains_any(&lowered, &["return", "exchange", "replace", "replacement"]) {
        return slots(Intent::ReturnEligibility);
    }

    if lowered.contains("warranty") || lowered.contains("guarantee") {
        return slots(Intent::WarrantyStatus);
    }

    let search_verbs = [
        "suggest",
        "recommend",
        "show me",
        "find",
        "looking for",
        "under",
        "below",
        "tell me about",
        "have in store",
        "available",
        "all the",
        "sell",
        "best",
        "good for",
        "suitable for",
        "ideal for",
    ];

    // A category plus search language is a catalog query for that category.
    if category.is_some() && contains_any(&lowered, &search_verbs) {
        return slots(Intent::ProductSearch);
    }

    // Catalog-wide questions without a category.
    if contains_any(
        &lowered,
        &[
            "catalog",
            "catalogue",
            "what do you offer",
            "what all you offer",
            "what all you have",
            "all products",
        ],
    ) || (lowered.contains("products") && lowered.contains("sell"))
    {
        return RouterInfo {
            intent: Intent::ProductSearch,
            order_id: order_id.clone(),
            category: None,
            max_price,
        };
    }

    slots(Intent::GeneralRag)
}
