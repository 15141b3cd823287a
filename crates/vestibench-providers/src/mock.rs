//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vestibench_core::traits::{
    extract_alternative, AnswerProvider, AnswerRequest, AnswerResponse, ModelInfo, TokenUsage,
};

/// A mock answer provider for testing the engine without real API calls.
///
/// Returns configurable replies based on question-text matching.
pub struct MockProvider {
    /// Map of question substring → reply text.
    responses: HashMap<String, String>,
    /// Default reply if no question matches.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<AnswerRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given substring → reply mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "E".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always gives the same reply.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<AnswerRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn answer(&self, request: &AnswerRequest) -> anyhow::Result<AnswerResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.question.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let alternative = extract_alternative(&content);
        let completion_tokens = (content.len() / 4) as u32;
        let prompt_tokens = (request.question.len() / 4) as u32;

        Ok(AnswerResponse {
            alternative,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
            content,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            free: true,
            notes: "Testing only".into(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestibench_core::model::Alternative;

    fn request(question: &str) -> AnswerRequest {
        AnswerRequest {
            model: "mock-model".into(),
            question: question.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("B");
        let response = provider.answer(&request("qualquer pergunta")).await.unwrap();
        assert_eq!(response.alternative, Some(Alternative::B));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn question_matching() {
        let mut responses = HashMap::new();
        responses.insert("logaritmo".to_string(), "Resposta: C".to_string());
        responses.insert("romantismo".to_string(), "A".to_string());

        let provider = MockProvider::new(responses);

        let resp = provider
            .answer(&request("Calcule o logaritmo decimal de 1000."))
            .await
            .unwrap();
        assert_eq!(resp.alternative, Some(Alternative::C));

        let resp = provider
            .answer(&request("Sobre o romantismo brasileiro, assinale."))
            .await
            .unwrap();
        assert_eq!(resp.alternative, Some(Alternative::A));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn unreadable_reply_yields_no_alternative() {
        let provider = MockProvider::with_fixed_response("não sei dizer");
        let response = provider.answer(&request("pergunta")).await.unwrap();
        assert_eq!(response.alternative, None);
    }
}
