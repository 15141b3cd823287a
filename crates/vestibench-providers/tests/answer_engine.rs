//! End-to-end answer engine tests using the mock provider.

use std::collections::HashMap;
use std::sync::Arc;

use vestibench_core::engine::{AnswerEngine, AnswerEngineConfig, ModelSpec, NoopReporter};
use vestibench_core::model::{Alternative, AnswerKey, ExamDay, ExamQuestion};
use vestibench_core::traits::AnswerProvider;
use vestibench_providers::mock::MockProvider;

fn question(day: ExamDay, number: u32, text: &str) -> ExamQuestion {
    ExamQuestion {
        day,
        number,
        text: text.into(),
        page: 1,
        image_count: 0,
    }
}

fn engine_with(mock: MockProvider) -> AnswerEngine {
    let mut providers: HashMap<String, Arc<dyn AnswerProvider>> = HashMap::new();
    providers.insert("mock".into(), Arc::new(mock));
    AnswerEngine::new(providers, AnswerEngineConfig::default())
}

#[tokio::test]
async fn answers_and_grades_a_run() {
    let mut responses = HashMap::new();
    responses.insert("romantismo".to_string(), "A".to_string());
    responses.insert("logaritmo".to_string(), "Resposta: C".to_string());
    let engine = engine_with(MockProvider::new(responses));

    let questions = vec![
        question(ExamDay::First, 1, "Sobre o romantismo brasileiro, assinale."),
        question(ExamDay::Second, 61, "Calcule o logaritmo decimal de 1000."),
    ];
    let models = vec![ModelSpec {
        provider: "mock".into(),
        model: "mock-model".into(),
    }];

    let run = engine.run(&questions, &models, &NoopReporter).await.unwrap();
    assert_eq!(run.outcomes.len(), 2);
    assert_eq!(run.outcomes[0].alternative, Some(Alternative::A));
    assert_eq!(run.outcomes[1].alternative, Some(Alternative::C));

    let mut key = AnswerKey::default();
    key.first_day.insert(1, Alternative::A);
    key.second_day.insert(61, Alternative::D);

    let graded = run.grade(&key);
    let answers = &graded["mock-model"];
    assert!(answers.first_day.matches.contains(&1));
    let mismatch = answers.second_day.mismatches[&61].as_ref().unwrap();
    assert_eq!(mismatch.given, "C");
    assert_eq!(mismatch.expected, "D");
}

#[tokio::test]
async fn unknown_provider_is_skipped() {
    let engine = engine_with(MockProvider::with_fixed_response("B"));
    let questions = vec![question(ExamDay::First, 1, "Pergunta qualquer.")];
    let models = vec![ModelSpec {
        provider: "missing".into(),
        model: "ghost".into(),
    }];

    let run = engine.run(&questions, &models, &NoopReporter).await.unwrap();
    assert!(run.outcomes.is_empty());
}

#[tokio::test]
async fn outcomes_are_sorted_deterministically() {
    let engine = engine_with(MockProvider::with_fixed_response("B"));
    let questions = vec![
        question(ExamDay::Second, 70, "Questão de física sobre óptica geométrica."),
        question(ExamDay::First, 2, "Questão de literatura sobre o modernismo."),
        question(ExamDay::First, 1, "Questão de gramática da língua portuguesa."),
    ];
    let models = vec![ModelSpec {
        provider: "mock".into(),
        model: "mock-model".into(),
    }];

    let run = engine.run(&questions, &models, &NoopReporter).await.unwrap();
    let order: Vec<u32> = run.outcomes.iter().map(|o| o.number).collect();
    assert_eq!(order, [1, 2, 70]);
}
