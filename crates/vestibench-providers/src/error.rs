//! Provider error types.
//!
//! The canonical `ProviderError` lives in `vestibench-core` so the answer
//! engine can downcast and classify errors for retry decisions; it is
//! re-exported here for provider implementations and their callers.

pub use vestibench_core::error::ProviderError;
