//! Anthropic provider using the Messages API.
//!
//! Sends image + prompt via the Messages API with base64 image content blocks.

use super::retry::send_error;
use super::service::{is_usable_key, DescriptionRequest, DescriptionService, PromptSettings};
use super::source::ImageInput;
use crate::error::ServiceError;
use crate::types::Description;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Anthropic provider using the Messages API.
pub struct AnthropicProvider {
    api_key: Option<String>,
    model: String,
    settings: PromptSettings,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub(crate) fn new(
        api_key: Option<String>,
        model: &str,
        settings: PromptSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            settings,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    async fn generate(&self, request: &DescriptionRequest) -> Result<Description, ServiceError> {
        let start = Instant::now();

        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_string(),
                            media_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                    ContentBlock::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", self.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| send_error("Anthropic", e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Request {
                message: format!("Anthropic HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let messages_resp: MessagesResponse =
            resp.json().await.map_err(|e| ServiceError::Request {
                message: format!("Failed to parse Anthropic response: {e}"),
                status_code: None,
            })?;

        let text = messages_resp
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::Request {
                message: "Anthropic returned empty response, no text content generated"
                    .to_string(),
                status_code: None,
            });
        }

        Ok(Description {
            text,
            model: messages_resp.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "image")]
    Image { source: ImageSource },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
    model: String,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[async_trait]
impl DescriptionService for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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

    #[test]
    fn test_content_blocks_are_tagged() {
        let block = ContentBlock::Image {
            source: ImageSource {
                source_type: "base64".into(),
                media_type: "image/png".into(),
                data: "AAAA".into(),
            },
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["source"]["type"], "base64");
    }

    #[test]
    fn test_response_skips_non_text_blocks() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"Splashed."},{"type":"tool_use"}],
                "model":"claude-sonnet-4-20250514"}"#,
        )
        .unwrap();
        let texts: Vec<_> = resp.content.into_iter().filter_map(|c| c.text).collect();
        assert_eq!(texts, vec!["Splashed.".to_string()]);
    }
}
