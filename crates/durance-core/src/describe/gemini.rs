//! Gemini provider using the Generative Language `generateContent` API.
//!
//! Sends the image as an inline data part followed by the text prompt and
//! returns only the generated text.

use super::retry::send_error;
use super::service::{is_usable_key, DescriptionRequest, DescriptionService, PromptSettings};
use super::source::ImageInput;
use crate::error::ServiceError;
use crate::types::Description;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Gemini provider.
pub struct GeminiProvider {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    settings: PromptSettings,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub(crate) fn new(
        endpoint: &str,
        api_key: Option<String>,
        model: &str,
        settings: PromptSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            settings,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn generate(&self, request: &DescriptionRequest) -> Result<Description, ServiceError> {
        let start = Instant::now();
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| send_error("Gemini", e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Request {
                message: format!("Gemini HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let generate_resp: GenerateResponse =
            resp.json().await.map_err(|e| ServiceError::Request {
                message: format!("Failed to parse Gemini response: {e}"),
                status_code: None,
            })?;

        let text = generate_resp.text();
        if text.is_empty() {
            return Err(ServiceError::Request {
                message: "Gemini returned empty response, no text content generated".to_string(),
                status_code: None,
            });
        }

        Ok(Description {
            text,
            model: generate_resp.model_version.unwrap_or_else(|| self.model.clone()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    model_version: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl DescriptionService for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(is_usable_key)
    }

    async fn describe(
        &self,
        image_ref: &str,
        action_label: &str,
    ) -> Result<Description, ServiceError> {
        let image = ImageInput::load(image_ref, &self.client).await?;
        let request = DescriptionRequest::with_settings(image, &self.settings, action_label);
        self.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PromptSettings {
        PromptSettings {
            system_prompt: "Narrate.".into(),
            max_tokens: 100,
            temperature: 0.5,
        }
    }

    #[test]
    fn test_url_includes_model() {
        let provider = GeminiProvider::new(
            "https://example.test/v1beta/",
            Some("key".into()),
            "gemini-1.5-flash",
            settings(),
            Duration::from_secs(5),
        );
        assert_eq!(
            provider.url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_serialization() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".into(),
                            data: "AAAA".into(),
                        },
                    },
                    Part::Text {
                        text: "hello".into(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 100,
                temperature: 0.5,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"A startled "},{"text":"cat. "}]}}],
                "modelVersion":"gemini-1.5-flash-002"}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), "A startled cat.");
        assert_eq!(resp.model_version.as_deref(), Some("gemini-1.5-flash-002"));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(resp.text().is_empty());
    }

    #[test]
    fn test_is_configured_requires_real_key() {
        let unconfigured =
            GeminiProvider::new("https://x", None, "m", settings(), Duration::from_secs(1));
        assert!(!unconfigured.is_configured());
        let configured = GeminiProvider::new(
            "https://x",
            Some("AIza-real".into()),
            "m",
            settings(),
            Duration::from_secs(1),
        );
        assert!(configured.is_configured());
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0])
            .unwrap();

        let provider = GeminiProvider::new(
            "http://127.0.0.1:1/v1beta",
            Some("AIza-real".into()),
            "m",
            settings(),
            Duration::from_secs(5),
        );
        let err = provider
            .describe(file.path().to_str().unwrap(), "Poke")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unreachable { .. }), "{err:?}");
        assert!(crate::describe::retry::is_retryable(&err));
    }
}
