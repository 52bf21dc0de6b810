use std::time::Instant;

use super::parser::parse_decision;
use super::prompt::{render_prompt, UNDERWRITING_SYSTEM_PROMPT};
use super::types::{DealDecision, UnderwritingPayload};
use super::UnderwritingError;

/// Generative model client abstraction (allows mocking).
pub trait LlmClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, UnderwritingError>;
}

impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, UnderwritingError> {
        (**self).generate(model, prompt, system)
    }
}

/// Sends an assembled payload to the decision engine and parses its verdict.
///
/// No retries: a failed call or an unparseable reply is returned to the caller.
pub struct DealEvaluator {
    llm: Box<dyn LlmClient + Send + Sync>,
    model: String,
}

impl DealEvaluator {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn evaluate(&self, payload: &UnderwritingPayload) -> Result<DealDecision, UnderwritingError> {
        let start = Instant::now();
        let prompt = render_prompt(payload)?;

        let response = self
            .llm
            .generate(&self.model, &prompt, UNDERWRITING_SYSTEM_PROMPT)?;
        if response.trim().is_empty() {
            return Err(UnderwritingError::EmptyResponse);
        }

        let decision = parse_decision(&response).inspect_err(|e| {
            tracing::warn!(error = %e, response_len = response.len(), "Decision reply could not be parsed");
        })?;

        tracing::info!(
            model = %self.model,
            decision = ?decision.decision,
            confidence = %decision.confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Deal evaluated"
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::underwriting::gemini::MockLlmClient;
    use crate::pipeline::underwriting::types::Decision;
    use serde_json::json;

    fn payload() -> UnderwritingPayload {
        UnderwritingPayload::assemble(
            Some(json!({ "buyBox": {}, "assumptions": { "askingPrice": 3500000 } })),
            Some(json!({ "netOperatingIncome": 250000 })),
            Some(json!({ "totalUnits": 40 })),
            Some(json!({ "propertyCrimeRating": "B" })),
        )
        .unwrap()
    }

    const REPLY: &str = "```json\n{\"decision\":\"FAIL\",\"confidence\":\"90%\",\"reasoning\":[\"DSCR 0.9\"],\"metrics\":{\"dscr\":0.9},\"risks\":[\"Default risk\"],\"advice\":[\"Lower price\"]}\n```";

    #[test]
    fn evaluate_parses_reply() {
        let evaluator = DealEvaluator::new(Box::new(MockLlmClient::new(REPLY)), "gemini-test");
        let decision = evaluator.evaluate(&payload()).unwrap();
        assert_eq!(decision.decision, Decision::Fail);
        assert_eq!(decision.metrics.dscr, Some(0.9));
        assert_eq!(evaluator.model(), "gemini-test");
    }

    #[test]
    fn evaluate_sends_rendered_prompt_and_system_instruction() {
        let mock = std::sync::Arc::new(MockLlmClient::new(REPLY));
        let evaluator = DealEvaluator::new(Box::new(mock.clone()), "gemini-test");
        evaluator.evaluate(&payload()).unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gemini-test");
        assert!(calls[0].prompt.contains("\"askingPrice\": 3500000"));
        assert_eq!(calls[0].system, UNDERWRITING_SYSTEM_PROMPT);
    }

    #[test]
    fn empty_reply_is_an_error() {
        let evaluator = DealEvaluator::new(Box::new(MockLlmClient::new("  \n")), "m");
        assert!(matches!(evaluator.evaluate(&payload()), Err(UnderwritingError::EmptyResponse)));
    }

    #[test]
    fn engine_failure_propagates_without_retry() {
        let mock = std::sync::Arc::new(MockLlmClient::unreachable());
        let evaluator = DealEvaluator::new(Box::new(mock.clone()), "m");
        assert!(matches!(
            evaluator.evaluate(&payload()),
            Err(UnderwritingError::EngineConnection(_))
        ));
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn unparseable_reply_is_malformed() {
        let evaluator = DealEvaluator::new(Box::new(MockLlmClient::new("no json here")), "m");
        assert!(matches!(
            evaluator.evaluate(&payload()),
            Err(UnderwritingError::MalformedDecision(_))
        ));
    }
}
