use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::engine::LlmClient;
use super::UnderwritingError;
use crate::config::GeminiSettings;

/// Harm categories filtered on every request.
const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_LOW_AND_ABOVE";

/// Gemini HTTP client for hosted inference.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    temperature: f32,
    search_grounding: bool,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, UnderwritingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| UnderwritingError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            client,
            timeout_secs: settings.timeout_secs,
            temperature: settings.temperature,
            search_grounding: settings.search_grounding,
        })
    }

    fn request_body<'a>(&self, prompt: &'a str, system: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "text/plain",
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
            tools: if self.search_grounding {
                vec![Tool {
                    google_search: EmptyObject {},
                }]
            } else {
                Vec::new()
            },
        }
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: EmptyObject,
}

#[derive(Serialize)]
struct EmptyObject {}

/// Response body from `models/{model}:generateContent`
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GenerateContentResponse {
    /// Text of the first candidate, skipping reasoning parts.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl LlmClient for GeminiClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, UnderwritingError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let body = self.request_body(prompt, system);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    UnderwritingError::EngineConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    UnderwritingError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    UnderwritingError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model, "Gemini request rejected");
            return Err(UnderwritingError::EngineError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| UnderwritingError::ResponseParsing(e.to_string()))?;

        Ok(parsed.into_text())
    }
}

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub system: String,
}

/// Mock LLM client for testing. Returns a fixed reply and records each call.
pub struct MockLlmClient {
    response: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails as if the engine were down.
    pub fn unreachable() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, UnderwritingError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
                system: system.to_string(),
            });
        }
        self.response
            .clone()
            .ok_or_else(|| UnderwritingError::EngineConnection("mock".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str, search_grounding: bool) -> GeminiSettings {
        GeminiSettings {
            api_key: "test-key".into(),
            model: "gemini-2.5-pro".into(),
            base_url: base_url.into(),
            timeout_secs: 5,
            temperature: 2.0,
            search_grounding,
        }
    }

    #[test]
    fn request_body_shape() {
        let client = GeminiClient::new(&settings("https://example.invalid/", true)).unwrap();
        let body = serde_json::to_value(client.request_body("the deal", "be an underwriter")).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be an underwriter");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "the deal");
        assert_eq!(body["generationConfig"]["temperature"], 2.0);
        assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][3]["category"], "HARM_CATEGORY_DANGEROUS_CONTENT");
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_LOW_AND_ABOVE");
        assert_eq!(body["tools"][0]["googleSearch"], serde_json::json!({}));
        assert_eq!(client.base_url, "https://example.invalid");
    }

    #[test]
    fn grounding_can_be_disabled() {
        let client = GeminiClient::new(&settings("https://example.invalid", false)).unwrap();
        let body = serde_json::to_value(client.request_body("p", "s")).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn response_text_skips_thoughts() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "```json\n{" },
                        { "text": "}\n```" }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 10 }
        }))
        .unwrap();
        assert_eq!(parsed.into_text(), "```json\n{}\n```");
    }

    #[test]
    fn blocked_response_has_no_text() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert_eq!(parsed.into_text(), "");
    }

    #[test]
    fn connection_refused_maps_to_engine_connection() {
        let client = GeminiClient::new(&settings("http://127.0.0.1:1", false)).unwrap();
        let err = client.generate("gemini-2.5-pro", "p", "s").unwrap_err();
        assert!(matches!(err, UnderwritingError::EngineConnection(url) if url == "http://127.0.0.1:1"));
    }

    #[test]
    fn mock_records_calls() {
        let mock = MockLlmClient::new("ok");
        assert_eq!(mock.generate("m", "p", "s").unwrap(), "ok");
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "p");

        let down = MockLlmClient::unreachable();
        assert!(down.generate("m", "p", "s").is_err());
    }
}
