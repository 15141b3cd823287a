//! The `vestibench answer` command.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use vestibench_core::engine::{
    AnswerEngine, AnswerEngineConfig, ModelSpec, ProgressReporter, QuestionOutcome,
};
use vestibench_core::model::AnswerSet;
use vestibench_core::parser;
use vestibench_core::traits::AnswerProvider;
use vestibench_providers::config::load_config_from;
use vestibench_providers::create_provider;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_question_start(&self, question_id: &str, model: &str) {
        eprintln!("  Asking: {model} :: {question_id}");
    }

    fn on_question_answered(&self, outcome: &QuestionOutcome) {
        let letter = outcome
            .alternative
            .map(|a| a.to_string())
            .unwrap_or_else(|| "?".to_string());
        eprintln!(
            "  Done: {} :: {} -> {} ({}ms)",
            outcome.model, outcome.question_id, letter, outcome.latency_ms,
        );
    }

    fn on_question_error(&self, question_id: &str, model: &str, error: &str) {
        eprintln!("  ERROR: {model} :: {question_id}: {error}");
    }

    fn on_run_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} answered, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    questions_path: PathBuf,
    models_str: Option<String>,
    key_path: Option<PathBuf>,
    parallelism: usize,
    temperature: Option<f64>,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let temperature = temperature.unwrap_or(config.default_temperature);
    anyhow::ensure!(
        (0.0..=2.0).contains(&temperature),
        "temperature must be between 0.0 and 2.0"
    );

    let questions = parser::load_questions(&questions_path)?;
    anyhow::ensure!(!questions.is_empty(), "no questions to answer");

    // Parse models as "provider/model" pairs.
    let models: Vec<ModelSpec> = if let Some(m) = &models_str {
        m.split(',')
            .map(|s| {
                let parts: Vec<&str> = s.trim().splitn(2, '/').collect();
                if parts.len() == 2 {
                    ModelSpec {
                        provider: parts[0].to_string(),
                        model: parts[1].to_string(),
                    }
                } else {
                    ModelSpec {
                        provider: config.default_provider.clone(),
                        model: parts[0].to_string(),
                    }
                }
            })
            .collect()
    } else {
        vec![ModelSpec {
            provider: config.default_provider.clone(),
            model: config.default_model.clone(),
        }]
    };

    let mut providers: HashMap<String, Arc<dyn AnswerProvider>> = HashMap::new();
    for model_spec in &models {
        if providers.contains_key(&model_spec.provider) {
            continue;
        }
        if let Some(pconfig) = config.providers.get(&model_spec.provider) {
            let provider = create_provider(&model_spec.provider, pconfig)?;
            providers.insert(model_spec.provider.clone(), Arc::from(provider));
        } else {
            anyhow::bail!(
                "provider '{}' not found in config. Available: {:?}",
                model_spec.provider,
                config.providers.keys().collect::<Vec<_>>()
            );
        }
    }

    let engine_config = AnswerEngineConfig {
        parallelism,
        temperature,
        max_tokens: 1000,
        max_retries_per_question: config.max_retries,
        retry_delay: Duration::from_millis(config.retry_delay_ms),
        system_prompt_override: None,
    };

    eprintln!(
        "vestibench — answering {} questions x {} models",
        questions.len(),
        models.len()
    );

    let engine = AnswerEngine::new(providers, engine_config);
    let run = engine.run(&questions, &models, &ConsoleReporter).await?;

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let run_path = output.join(format!("answers-{timestamp}.json"));
    run.save_json(&run_path)?;
    println!("Answer run saved to: {}", run_path.display());

    if let Some(key_path) = key_path {
        let key = parser::load_answer_key(&key_path)?;
        let graded = run.grade(&key);
        let graded_path = output.join(format!("graded-{timestamp}.json"));
        let wire = graded_to_wire(&graded);
        std::fs::write(&graded_path, serde_json::to_string_pretty(&wire)?)?;
        println!("Graded answer sets saved to: {}", graded_path.display());

        for (model, answers) in &graded {
            println!(
                "{model}: day 1 {}/{} correct, day 2 {}/{} correct",
                answers.first_day.matches.len(),
                answers.first_day.answered(),
                answers.second_day.matches.len(),
                answers.second_day.answered(),
            );
        }
    }

    Ok(())
}

/// Serialize graded answer sets in the candidate-record wire format, so the
/// output feeds straight into `vestibench score`.
fn graded_to_wire(graded: &BTreeMap<String, AnswerSet>) -> serde_json::Value {
    let day_to_wire = |day: &vestibench_core::model::DayAnswers| {
        let mismatches: serde_json::Map<String, serde_json::Value> = day
            .mismatches
            .iter()
            .map(|(question, mismatch)| {
                let detail = match mismatch {
                    Some(m) => serde_json::json!({
                        "resposta_llm": m.given,
                        "resposta_correta": m.expected,
                    }),
                    None => serde_json::Value::Null,
                };
                (question.to_string(), detail)
            })
            .collect();
        serde_json::json!({
            "iguais": day.matches.iter().collect::<Vec<_>>(),
            "diferentes": mismatches,
        })
    };

    let candidates: serde_json::Map<String, serde_json::Value> = graded
        .iter()
        .map(|(model, answers)| {
            (
                model.clone(),
                serde_json::json!({
                    "PRIMEIRA_PROVA": day_to_wire(&answers.first_day),
                    "SEGUNDA_PROVA": day_to_wire(&answers.second_day),
                }),
            )
        })
        .collect();

    serde_json::Value::Object(candidates)
}
