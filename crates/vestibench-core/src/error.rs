//! Error types shared across the workspace.
//!
//! `ConfigError` covers bad reference data (exam structure, weight tables,
//! alias tables) and is always fatal: it is detected at load time and shared
//! across every candidate, so nothing downstream attempts to recover from it.
//! `ProviderError` covers LLM backend failures and is defined here so the
//! answer engine can downcast and classify errors for retry decisions
//! without string matching.

use thiserror::Error;

use crate::model::Subject;

/// Errors raised while loading or validating reference data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A question range could not be parsed, or runs backwards.
    #[error("subject '{subject}' has a malformed question range '{range}'")]
    MalformedRange { subject: String, range: String },

    /// Two different subjects claim the same question number.
    #[error("question {question} is assigned to both {first} and {second}")]
    OverlappingQuestion {
        question: u32,
        first: Subject,
        second: Subject,
    },

    /// A subject name in the exam structure is not one of the known subjects.
    #[error("unknown subject '{name}' in {context}")]
    UnknownSubject { name: String, context: String },

    /// A weight table entry references an abbreviation with no subject.
    #[error("weight table for '{program}' references unknown subject key '{key}'")]
    UnknownWeightKey { program: String, key: String },

    /// Weights must be non-negative.
    #[error("weight table for '{program}' has negative weight {weight} on {subject}")]
    NegativeWeight {
        program: String,
        subject: Subject,
        weight: f64,
    },

    /// A question appears in both the correct and incorrect sets of one day.
    #[error("candidate '{candidate}' lists question {question} as both correct and incorrect")]
    ConflictingAnswer { candidate: String, question: u32 },

    /// A program alias matches more than one cutoff-table entry.
    #[error("alias '{alias}' for program '{program}' matches multiple cutoff entries: {candidates:?}")]
    AmbiguousAlias {
        program: String,
        alias: String,
        candidates: Vec<String>,
    },

    /// The exam info file does not contain the requested edition.
    #[error("edition {requested:?} not found; available editions: {available:?}")]
    MissingEdition {
        requested: Option<String>,
        available: Vec<String>,
    },
}

/// Errors that can occur when interacting with an LLM backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}
