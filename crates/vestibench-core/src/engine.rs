//! Async answer-acquisition engine.
//!
//! Fans exam questions out to one or more LLM backends with bounded
//! parallelism and retries on transient provider errors, then grades the
//! collected letters against the official answer key into the per-day
//! answer sets the scoring engine consumes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::model::{Alternative, AnswerKey, AnswerSet, ExamDay, ExamQuestion, Mismatch};
use crate::traits::{AnswerProvider, AnswerRequest, TokenUsage};

/// Configuration for the answer engine.
#[derive(Debug, Clone)]
pub struct AnswerEngineConfig {
    /// Maximum concurrent requests.
    pub parallelism: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens for the reply.
    pub max_tokens: u32,
    /// Retries on provider errors (not unreadable answers).
    pub max_retries_per_question: u32,
    /// Delay between retries.
    pub retry_delay: Duration,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for AnswerEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            temperature: 0.3,
            max_tokens: 1000,
            max_retries_per_question: 3,
            retry_delay: Duration::from_secs(1),
            system_prompt_override: None,
        }
    }
}

/// Which model to query.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    /// Provider name (e.g. "anthropic").
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_question_start(&self, question_id: &str, model: &str);
    fn on_question_answered(&self, outcome: &QuestionOutcome);
    fn on_question_error(&self, question_id: &str, model: &str, error: &str);
    fn on_run_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_question_start(&self, _: &str, _: &str) {}
    fn on_question_answered(&self, _: &QuestionOutcome) {}
    fn on_question_error(&self, _: &str, _: &str, _: &str) {}
    fn on_run_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// One answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub day: ExamDay,
    pub number: u32,
    pub model: String,
    pub provider: String,
    /// Raw reply content.
    pub content: String,
    /// The extracted alternative; `None` when the reply was unreadable.
    pub alternative: Option<Alternative>,
    pub token_usage: TokenUsage,
    pub latency_ms: u64,
    pub run_id: Uuid,
}

/// A complete answer-acquisition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRun {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub models: Vec<String>,
    pub outcomes: Vec<QuestionOutcome>,
    pub duration_ms: u64,
}

impl AnswerRun {
    /// Grade every model's answers against the official key.
    ///
    /// A readable answer matching the key lands in the day's matches set;
    /// anything else counts as wrong, recording the chosen letter (or `-`
    /// for an unreadable reply) and the expected one. Questions absent from
    /// the key are skipped.
    pub fn grade(&self, key: &AnswerKey) -> BTreeMap<String, AnswerSet> {
        let mut graded: BTreeMap<String, AnswerSet> = BTreeMap::new();
        for outcome in &self.outcomes {
            let Some(&expected) = key.day(outcome.day).get(&outcome.number) else {
                tracing::debug!(
                    question = %outcome.question_id,
                    "question not present in answer key, skipping"
                );
                continue;
            };
            let answers = graded.entry(outcome.model.clone()).or_default();
            let bucket = answers.day_mut(outcome.day);
            match outcome.alternative {
                Some(given) if given == expected => {
                    bucket.matches.insert(outcome.number);
                }
                other => {
                    let given = other.map_or_else(|| "-".to_string(), |a| a.to_string());
                    bucket.mismatches.insert(
                        outcome.number,
                        Some(Mismatch {
                            given,
                            expected: expected.to_string(),
                        }),
                    );
                }
            }
        }
        graded
    }

    /// Save the run as JSON to a file.
    pub fn save_json(&self, path: &std::path::Path) -> Result<()> {
        use anyhow::Context;
        let json = serde_json::to_string_pretty(self).context("failed to serialize answer run")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write answer run to {}", path.display()))?;
        Ok(())
    }
}

/// The answer engine.
pub struct AnswerEngine {
    providers: HashMap<String, Arc<dyn AnswerProvider>>,
    config: AnswerEngineConfig,
}

impl AnswerEngine {
    pub fn new(
        providers: HashMap<String, Arc<dyn AnswerProvider>>,
        config: AnswerEngineConfig,
    ) -> Self {
        Self { providers, config }
    }

    /// Ask every model to answer every question.
    pub async fn run(
        &self,
        questions: &[ExamQuestion],
        models: &[ModelSpec],
        progress: &dyn ProgressReporter,
    ) -> Result<AnswerRun> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));

        let mut futures = FuturesUnordered::new();

        for model_spec in models {
            let Some(provider) = self.providers.get(&model_spec.provider) else {
                tracing::warn!("provider '{}' not found, skipping", model_spec.provider);
                continue;
            };

            for question in questions {
                let provider = Arc::clone(provider);
                let semaphore = Arc::clone(&semaphore);
                let question = question.clone();
                let model = model_spec.model.clone();
                let provider_name = model_spec.provider.clone();
                let config = self.config.clone();

                futures.push(async move {
                    let question_id = question.id();
                    let ctx_model = model.clone();
                    let inner = async move {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                        let request = AnswerRequest {
                            model: model.clone(),
                            question: question.text.clone(),
                            system_prompt: config.system_prompt_override.clone(),
                            max_tokens: config.max_tokens,
                            temperature: config.temperature,
                        };

                        // Retry transient provider errors with exponential backoff.
                        let mut last_error = None;
                        let mut retry_delay = config.retry_delay;
                        for retry in 0..=config.max_retries_per_question {
                            if retry > 0 {
                                tokio::time::sleep(retry_delay).await;
                                retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
                            }
                            match provider.answer(&request).await {
                                Ok(response) => {
                                    return Ok(QuestionOutcome {
                                        question_id: question.id(),
                                        day: question.day,
                                        number: question.number,
                                        model: model.clone(),
                                        provider: provider_name.clone(),
                                        alternative: response.alternative,
                                        content: response.content,
                                        token_usage: response.token_usage,
                                        latency_ms: response.latency_ms,
                                        run_id,
                                    });
                                }
                                Err(e) => {
                                    let provider_error = e.downcast_ref::<ProviderError>();
                                    if provider_error.is_some_and(ProviderError::is_permanent) {
                                        return Err(e);
                                    }
                                    if let Some(ms) =
                                        provider_error.and_then(ProviderError::retry_after_ms)
                                    {
                                        retry_delay = Duration::from_millis(ms);
                                    }
                                    last_error = Some(e);
                                }
                            }
                        }

                        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")))
                    };
                    (question_id, ctx_model, inner.await)
                });
            }
        }

        let total = futures.len();
        let mut outcomes = Vec::new();
        let mut completed = 0usize;
        let mut failed = 0usize;

        while let Some((question_id, model, result)) = futures.next().await {
            match result {
                Ok(outcome) => {
                    progress.on_question_answered(&outcome);
                    outcomes.push(outcome);
                    completed += 1;
                }
                Err(e) => {
                    tracing::error!("answer failed for {question_id}/{model}: {e:#}");
                    progress.on_question_error(&question_id, &model, &e.to_string());
                    failed += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_run_complete(total, completed, failed, elapsed);

        // Deterministic order regardless of completion order.
        outcomes.sort_by(|a, b| {
            (a.model.as_str(), a.day, a.number).cmp(&(b.model.as_str(), b.day, b.number))
        });

        Ok(AnswerRun {
            id: run_id,
            created_at: Utc::now(),
            models: models.iter().map(|m| m.model.clone()).collect(),
            outcomes,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
