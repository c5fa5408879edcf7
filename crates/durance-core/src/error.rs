//! Error types for Durance.
//!
//! Local rejections (configuration, durability, catalog) are kept apart from
//! remote failures so callers can render different messaging for each.

use thiserror::Error;

/// Top-level error type for Durance operations.
#[derive(Error, Debug)]
pub enum DuranceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Gallery persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Photo action errors
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures raised by a description service call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The provider rejected the request or could not be reached
    #[error("{message}")]
    Request {
        message: String,
        /// HTTP status when the failure came from a response
        status_code: Option<u16>,
    },

    /// The provider could not be reached, or the HTTP client gave up waiting
    #[error("{message}")]
    Unreachable { message: String },

    /// The call did not complete in time
    #[error("Description request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The image reference could not be loaded
    #[error("Failed to load image: {message}")]
    Image { message: String },
}

/// Durable storage failures.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// No photo with this id exists in the gallery
    #[error("Photo not found: {0}")]
    PhotoNotFound(String),

    /// Reading or writing the backing file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored gallery is not valid JSON
    #[error("Stored gallery is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Reasons `can_apply` refuses an action before any side effect happens.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The description service has no usable credential
    #[error("Description service is not configured; set an API key for the provider")]
    ServiceNotConfigured,

    /// The photo has no durability left for primary actions
    #[error("Durability exhausted: this photo has reached 0%")]
    DurabilityExhausted,
}

/// Errors returned by `PhotoActionEngine::apply_action`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Local precondition failure (configuration or durability)
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// The label is not part of the tier's catalog
    #[error("Unknown action '{label}' for {tier} tier")]
    UnknownAction { tier: String, label: String },

    /// The photo slot has no image to describe
    #[error("Photo {0} has no image assigned")]
    PhotoUnassigned(String),

    /// Another action for the same photo is still awaiting its result
    #[error("An action for photo {0} is already in progress")]
    AlreadyInProgress(String),

    /// The description service call failed; durability is unchanged
    #[error("Description service failed: {0}")]
    ServiceFailure(String),

    /// The description was obtained but the new percentage was not saved
    #[error("Failed to save percentage {new_percentage}%: {message}")]
    Persistence {
        /// Description returned by the service, kept for the caller
        description: String,
        /// Percentage that should have been written
        new_percentage: u8,
        message: String,
    },

    /// A save attempted to raise durability
    #[error("Refusing to raise durability from {current}% to {requested}%")]
    PercentageIncrease { current: u8, requested: u8 },
}

impl ActionError {
    /// True for errors decided locally, before any remote call.
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            ActionError::ServiceFailure(_) | ActionError::Persistence { .. }
        )
    }
}

/// Convenience type alias for Durance results.
pub type Result<T> = std::result::Result<T, DuranceError>;
