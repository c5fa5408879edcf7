//! OpenAI provider using the Chat Completions API.
//!
//! Sends the image via data URL in the user message content array.

use super::retry::send_error;
use super::service::{is_usable_key, DescriptionRequest, DescriptionService, PromptSettings};
use super::source::ImageInput;
use crate::error::ServiceError;
use crate::types::Description;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    api_key: Option<String>,
    model: String,
    settings: PromptSettings,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
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

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.as_deref().unwrap_or_default()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| send_error("OpenAI", e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Request {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| ServiceError::Request {
            message: format!("Failed to parse OpenAI response: {e}"),
            status_code: None,
        })?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Request {
                message: "OpenAI returned no content".to_string(),
                status_code: None,
            })?
            .to_string();

        Ok(Description {
            text,
            model: chat_resp.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl DescriptionService for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
    fn test_image_url_content_shape() {
        let content = ChatContent::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/jpeg;base64,AAAA".into(),
            },
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "image_url");
        assert_eq!(json["image_url"]["url"], "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_is_configured_rejects_unresolved_reference() {
        let provider = OpenAiProvider::new(
            Some("${OPENAI_API_KEY}".into()),
            "gpt-4o-mini",
            PromptSettings {
                system_prompt: String::new(),
                max_tokens: 10,
                temperature: 0.0,
            },
            Duration::from_secs(1),
        );
        assert!(!provider.is_configured());
    }
}
