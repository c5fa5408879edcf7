//! Description service trait and request types.
//!
//! Defines the boundary the engine calls for primary actions, plus the
//! factory that creates the right provider from config and CLI flags.

use super::source::ImageInput;
use crate::config::Config;
use crate::error::{ConfigError, ServiceError};
use crate::types::Description;
use async_trait::async_trait;
use std::time::Duration;

/// Settings shared by every provider request.
#[derive(Debug, Clone)]
pub(crate) struct PromptSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl PromptSettings {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config.service.system_prompt.clone(),
            max_tokens: config.service.max_tokens,
            temperature: config.service.temperature,
        }
    }
}

/// A request to describe the result of an action on an image.
#[derive(Debug, Clone)]
pub struct DescriptionRequest {
    /// The photo the action was applied to
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl DescriptionRequest {
    /// Build a request for one action label.
    ///
    /// The prompt is the fixed system instruction followed by the applied
    /// action and a closing instruction to describe the subject's state.
    pub fn for_action(
        image: ImageInput,
        system_prompt: &str,
        action_label: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        let prompt = format!(
            "{system_prompt}\n\n\
             Applied action: {action_label}\n\n\
             Describe the state of the subject in the photo after this action \
             and the visible changes."
        );

        Self {
            image,
            prompt,
            max_tokens,
            temperature,
        }
    }

    pub(crate) fn with_settings(
        image: ImageInput,
        settings: &PromptSettings,
        action_label: &str,
    ) -> Self {
        Self::for_action(
            image,
            &settings.system_prompt,
            action_label,
            settings.max_tokens,
            settings.temperature,
        )
    }
}

/// The external text-generation boundary consumed by the engine.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the engine holds an `Arc<dyn DescriptionService>`).
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// True only when a non-empty, non-placeholder credential is present.
    ///
    /// Must not touch the network or the environment.
    fn is_configured(&self) -> bool;

    /// Describe the photo behind `image_ref` after `action_label` was applied.
    async fn describe(
        &self,
        image_ref: &str,
        action_label: &str,
    ) -> Result<Description, ServiceError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whether a resolved key looks like a real credential.
///
/// Rejects empty keys, unresolved `${VAR}` references and template
/// placeholders such as `your_gemini_api_key_here`.
pub fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty()
        && !key.starts_with("${")
        && !(key.starts_with("your_") && key.ends_with("_here"))
}

/// Factory that creates the configured provider.
pub struct DescriptionServiceFactory;

impl DescriptionServiceFactory {
    /// Create a description service from config, with optional overrides.
    ///
    /// A missing API key does not fail construction: the provider is built
    /// unconfigured and the engine rejects primary actions with
    /// `ServiceNotConfigured`.
    pub fn create(
        config: &Config,
        provider_override: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Box<dyn DescriptionService>, ConfigError> {
        let provider = provider_override.unwrap_or(config.service.provider.as_str());
        let settings = PromptSettings::from_config(config);
        let timeout = Duration::from_millis(config.limits.describe_timeout_ms);

        match provider {
            "gemini" => {
                let cfg = config.service.gemini.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    resolve_env_var(&cfg.api_key),
                    &model,
                    settings,
                    timeout,
                )))
            }
            "anthropic" => {
                let cfg = config.service.anthropic.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    resolve_env_var(&cfg.api_key),
                    &model,
                    settings,
                    timeout,
                )))
            }
            "openai" => {
                let cfg = config.service.openai.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    resolve_env_var(&cfg.api_key),
                    &model,
                    settings,
                    timeout,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown description provider: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    #[test]
    fn test_prompt_contains_instruction_and_label() {
        let image = ImageInput::from_bytes(&[1, 2, 3]);
        let request = DescriptionRequest::for_action(image, "Narrate.", "Poke", 300, 0.7);
        assert!(request.prompt.starts_with("Narrate.\n\n"));
        assert!(request.prompt.contains("Applied action: Poke"));
        assert_eq!(request.max_tokens, 300);
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_usable_key() {
        assert!(is_usable_key("AIzaSy-real"));
        assert!(!is_usable_key(""));
        assert!(!is_usable_key("   "));
        assert!(!is_usable_key("${GEMINI_API_KEY}"));
        assert!(!is_usable_key("your_gemini_api_key_here"));
        assert!(!is_usable_key("your_api_key_here"));
    }

    #[test]
    fn test_factory_builds_unconfigured_provider_without_key() {
        let mut config = Config::default();
        config.service.openai = Some(OpenAiConfig {
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
        });
        let service = DescriptionServiceFactory::create(&config, Some("openai"), None).unwrap();
        assert_eq!(service.name(), "openai");
        assert!(!service.is_configured());
    }

    #[test]
    fn test_factory_placeholder_key_is_unconfigured() {
        let mut config = Config::default();
        config.service.gemini = Some(crate::config::GeminiConfig {
            api_key: "your_gemini_api_key_here".into(),
            ..Default::default()
        });
        let service = DescriptionServiceFactory::create(&config, None, None).unwrap();
        assert_eq!(service.name(), "gemini");
        assert!(!service.is_configured());
    }

    #[test]
    fn test_factory_literal_key_is_configured() {
        let mut config = Config::default();
        config.service.anthropic = Some(crate::config::AnthropicConfig {
            api_key: "sk-ant-test".into(),
            model: "claude-sonnet-4-20250514".into(),
        });
        let service =
            DescriptionServiceFactory::create(&config, Some("anthropic"), Some("claude-x"))
                .unwrap();
        assert!(service.is_configured());
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let config = Config::default();
        let result = DescriptionServiceFactory::create(&config, Some("telegraph"), None);
        assert!(result.is_err());
    }
}
