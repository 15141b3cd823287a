//! vestibench-providers — LLM backend integrations.
//!
//! Implements the `AnswerProvider` trait for Anthropic, OpenAI-compatible
//! endpoints, and Ollama, letting vestibench collect exam answers from
//! multiple LLM backends. The backend is chosen by configuration at
//! construction time; call sites only ever see the trait.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, VestibenchConfig};
pub use error::ProviderError;
