//! The LLM backend trait and answer-letter extraction.
//!
//! `AnswerProvider` is the capability interface the answer engine consumes;
//! one implementation per backend lives in `vestibench-providers`, selected
//! by configuration at construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Alternative;

// ---------------------------------------------------------------------------
// Answer provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that answer multiple-choice exam questions.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Ask the backend to answer one question.
    async fn answer(&self, request: &AnswerRequest) -> anyhow::Result<AnswerResponse>;

    /// List known models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to answer one exam question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Model identifier (e.g. "claude-3-5-sonnet-20241022").
    pub model: String,
    /// The question text, including its alternatives.
    pub question: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an answer request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The raw response content.
    pub content: String,
    /// The alternative extracted from the content, if any.
    pub alternative: Option<Alternative>,
    /// Model that actually produced the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Whether the model can be used without paid credits.
    pub free: bool,
    /// Short usage notes.
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Default system prompt
// ---------------------------------------------------------------------------

/// Default system prompt: answer with the bare alternative letter only.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você responde questões do vestibular da UFRGS.\n\
IMPORTANTE: Responda APENAS com a letra da alternativa correta (A, B, C, D ou E).\n\
NÃO forneça explicações, justificativas ou texto adicional.\n\
Responda somente: A, B, C, D ou E.";

// ---------------------------------------------------------------------------
// Answer letter extraction
// ---------------------------------------------------------------------------

/// Extract the chosen alternative from a free-form model reply.
///
/// Handles, in order of preference:
/// - a bare letter, possibly punctuated (`"B"`, `"c)"`, `"D."`)
/// - phrases that name the alternative (`"letra E"`, `"Resposta: C"`)
/// - a first line opening with a letter marker (`"D) porque..."`)
///
/// Returns `None` when no alternative can be read, including error text.
pub fn extract_alternative(response: &str) -> Option<Alternative> {
    let trimmed = response.trim();

    let bare = trimmed.trim_end_matches(['.', ')', ':', '!']).trim();
    if bare.chars().count() == 1 {
        if let Some(alternative) = bare.chars().next().and_then(Alternative::from_char) {
            return Some(alternative);
        }
    }

    let lower = response.to_lowercase();
    for marker in [
        "letra ",
        "alternativa ",
        "resposta: ",
        "resposta é ",
        "answer: ",
    ] {
        if let Some(pos) = lower.find(marker) {
            if let Some(alternative) = leading_alternative(&lower[pos + marker.len()..]) {
                return Some(alternative);
            }
        }
    }

    let first_line = trimmed.lines().next().unwrap_or_default();
    let mut chars = first_line.chars();
    if let (Some(first), Some(second)) = (chars.next(), chars.next()) {
        if matches!(second, ')' | '.' | ':' | '-') {
            if let Some(alternative) = Alternative::from_char(first) {
                return Some(alternative);
            }
        }
    }

    None
}

/// The alternative at the head of a string fragment, requiring the letter to
/// stand alone (not start a longer word).
fn leading_alternative(fragment: &str) -> Option<Alternative> {
    let fragment = fragment.trim_start_matches([' ', '"', '\'', '(', '[']);
    let mut chars = fragment.chars();
    let letter = chars.next().and_then(Alternative::from_char)?;
    match chars.next() {
        Some(next) if next.is_alphanumeric() => None,
        _ => Some(letter),
    }
}
