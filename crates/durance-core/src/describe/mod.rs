//! Description service integration.
//!
//! Provides the [`DescriptionService`] abstraction the engine talks to, plus
//! hosted multimodal backends (Gemini, Anthropic, OpenAI) that turn an image
//! reference and an action label into a short natural-language description.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod openai;
pub(crate) mod retry;
pub(crate) mod service;
pub(crate) mod source;

pub use service::{
    is_usable_key, resolve_env_var, DescriptionRequest, DescriptionService,
    DescriptionServiceFactory,
};
pub use source::ImageInput;

/// Provider identifiers accepted in `service.provider`.
pub const PROVIDERS: &[&str] = &["gemini", "anthropic", "openai"];
