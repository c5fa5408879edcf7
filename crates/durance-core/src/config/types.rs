//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where the gallery is stored
    pub data_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.durance"),
        }
    }
}

/// Limits and retry policy for description calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-attempt timeout for a description call in milliseconds
    pub describe_timeout_ms: u64,

    /// Automatic retries for transient failures (0 = report the first failure)
    pub retry_attempts: u32,

    /// Base backoff delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            describe_timeout_ms: 30_000,
            retry_attempts: 0,
            retry_delay_ms: 1000,
        }
    }
}

/// Action catalogs and daily allowances per tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Labels of primary actions (consume durability)
    pub primary: Vec<String>,

    /// Labels of secondary actions
    pub secondary: Vec<String>,

    /// Labels of bonus actions
    pub bonus: Vec<String>,

    /// Daily rights shown for the primary tier
    pub primary_rights: u32,

    /// Daily rights shown for the secondary tier
    pub secondary_rights: u32,

    /// Daily rights shown for the bonus tier
    pub bonus_rights: u32,
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            primary: labels(&["Poke", "Shove", "Splash", "Pinch"]),
            secondary: labels(&["Flick", "Pat", "Tug ears"]),
            bonus: labels(&["Stick out tongue", "Apologize", "Elbow", "Kiss"]),
            primary_rights: 3,
            secondary_rights: 1,
            bonus_rights: 1,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Default instruction sent ahead of every action label.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You narrate a playful photo game. \
The user applies an action to the person or object in the photo. \
Describe in 1-3 sentences how the subject looks and reacts after the action.";

/// Description service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Provider used for descriptions: "gemini", "anthropic" or "openai"
    pub provider: String,

    /// Fixed instruction included in every request
    pub system_prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 300,
            temperature: 0.7,
            gemini: None,
            anthropic: None,
            openai: None,
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API endpoint base
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}
