//! Retrieval-grounded answering over policy documents.
//!
//! The index is a keyword-overlap scorer over chunked text documents. It
//! backs both the `search_policy_docs` tool and the loop's fallback path. No
//! embeddings involved; scoring is deterministic and dependency-free.

mod chunking;

pub use chunking::{chunk_text, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::Result;
use crate::providers::{ModelClient, ModelTurn, TranscriptEntry};

/// Answer given when the context does not contain the requested fact.
pub const NOT_SURE_ANSWER: &str = "I'm not sure based on the available information.";

/// One scored chunk returned from the index.
#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub text: String,
    pub source: String,
    /// Relevance in 0.0..=1.0.
    pub score: f64,
}

/// Document retrieval seam.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Top `k` passages for `query`, best first. Deduplicated on
    /// (source, text).
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>>;
}

struct Chunk {
    text: String,
    source: String,
    words: HashSet<String>,
}

/// In-memory keyword index over chunked documents.
pub struct KeywordIndex {
    chunks: Vec<Chunk>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Chunk `text` and add every chunk under `source`.
    pub fn add_document(&mut self, source: &str, text: &str) {
        for chunk in chunk_text(text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP) {
            let words = tokenize(&chunk);
            self.chunks.push(Chunk {
                text: chunk,
                source: source.to_string(),
                words,
            });
        }
    }

    /// Index every `.txt` file directly under `<dir>/raw`, falling back to
    /// the built-in policy documents when none are found.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let mut index = Self::new();
        let raw = dir.as_ref().join("raw");
        if raw.is_dir() {
            let mut paths: Vec<_> = std::fs::read_dir(&raw)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            paths.sort();
            for path in paths {
                let text = std::fs::read_to_string(&path)?;
                let source = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                index.add_document(&source, &text);
            }
        }
        if index.chunks.is_empty() {
            index = Self::with_builtin_docs();
        }
        info!(chunks = index.chunks.len(), "policy index built");
        Ok(index)
    }

    /// Index seeded with the built-in policy documents.
    pub fn with_builtin_docs() -> Self {
        let mut index = Self::new();
        for (source, text) in builtin_policy_docs() {
            index.add_document(source, text);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::with_builtin_docs()
    }
}

#[async_trait]
impl Retriever for KeywordIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Passage> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let overlap = query_words.intersection(&chunk.words).count();
                if overlap == 0 {
                    return None;
                }
                Some(Passage {
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    score: overlap as f64 / query_words.len() as f64,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = HashSet::new();
        scored.retain(|p| seen.insert((p.source.clone(), p.text.clone())));
        scored.truncate(k);
        debug!(query_words = query_words.len(), hits = scored.len(), "policy search");
        Ok(scored)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(str::to_string)
        .collect()
}

/// Retrieval plus grounded generation.
pub struct RagService {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn ModelClient>,
}

/// The outcome of one grounded answer attempt.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<Value>,
}

impl RagService {
    pub fn new(retriever: Arc<dyn Retriever>, model: Arc<dyn ModelClient>) -> Self {
        Self { retriever, model }
    }

    /// Retrieve context for `question` and produce an answer grounded only
    /// in that context. One model call, no tools; a tool request from the
    /// model here is treated as "no answer".
    pub async fn answer(&self, question: &str, k: usize) -> Result<RagAnswer> {
        let passages = self.retriever.search(question, k).await?;
        let prompt = build_prompt(question, &passages);

        let transcript = vec![TranscriptEntry::user(prompt)];
        let turn = self
            .model
            .converse(GROUNDED_SYSTEM_PROMPT, &[], &transcript)
            .await?;

        let answer = match turn {
            ModelTurn::FinalAnswer(text) => text,
            ModelTurn::ToolRequest { .. } => NOT_SURE_ANSWER.to_string(),
        };

        let sources = passages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                json!({
                    "id": i + 1,
                    "source": p.source,
                    "preview": p.text.chars().take(200).collect::<String>(),
                })
            })
            .collect();

        Ok(RagAnswer { answer, sources })
    }
}

const GROUNDED_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that answers questions based ONLY on the provided context documents.

Rules:
- If the answer is clearly present in the context, answer concisely and clearly.
- If the answer is NOT in the context, say: \"I'm not sure based on the available information.\"
- Do NOT invent facts that are not supported by the context.
- When you use information from a specific document, mention it in brackets like [Doc 1], [Doc 2], etc.
- You can refer to multiple documents if needed, e.g., [Doc 1][Doc 3].";

fn build_prompt(question: &str, passages: &[Passage]) -> String {
    let context = passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[Doc {} | Source: {}]\n{}", i + 1, p.source, p.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Context:\n{context}\n\nUser question:\n{question}\n\nAnswer (follow the rules above):")
}

/// Demo policy documents indexed when no raw documents are provided.
fn builtin_policy_docs() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "return_policy.txt",
            "Return Policy. Items may be returned within 7 days of delivery in their \
             original packaging with all accessories included. Returns are not accepted \
             for orders that have not yet been delivered. To initiate a return, share your \
             order ID with support. Once the returned item is received and inspected, the \
             return is confirmed by email.",
        ),
        (
            "refund_policy.txt",
            "Refund Policy. Refunds are issued to the original payment method within 5 \
             to 7 business days after the returned item passes inspection. Shipping \
             charges are refunded only when the return is due to a defect or a wrong item \
             being shipped. Refunds for items bought during sale events follow the same \
             timeline.",
        ),
        (
            "shipping_policy.txt",
            "Shipping Policy. Standard shipping takes 3 to 5 business days within metro \
             areas and 5 to 8 business days elsewhere. Orders are processed within 24 \
             hours on business days. A tracking link is emailed once the order ships. \
             Delivery dates shown at checkout are estimates, not guarantees.",
        ),
        (
            "warranty_policy.txt",
            "Warranty Policy. Laptops carry a 12-month manufacturer warranty from the \
             delivery date. Headphones carry a 6-month warranty. Other accessories such \
             as keyboards and mice carry a 90-day warranty. Warranty covers manufacturing \
             defects only; physical damage and liquid damage are excluded. Warranty \
             claims require the order ID and product ID.",
        ),
    ]
}
