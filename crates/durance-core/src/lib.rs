//! Durance Core - photo actions with durability tracking.
//!
//! Each photo in a gallery carries a durability percentage. Actions are
//! grouped in tiers: primary actions ask a hosted multimodal model to
//! describe the photo after the action and cost 15 points of durability;
//! secondary and bonus actions only toggle display state.
//!
//! # Architecture
//!
//! ```text
//! front end → PhotoActionEngine → DescriptionService (Gemini/Anthropic/OpenAI)
//!                              └→ PersistenceClient (JSON file / memory)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use durance_core::{ActionTier, Config, DescriptionServiceFactory, JsonGalleryStore, PhotoActionEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> durance_core::Result<()> {
//!     let config = Config::load()?;
//!     let service = DescriptionServiceFactory::create(&config, None, None)?;
//!     let store = Arc::new(JsonGalleryStore::new(config.gallery_path()));
//!     let engine = PhotoActionEngine::from_config(&config, Arc::from(service), store);
//!
//!     let mut photo = durance_core::Photo::new("1", "cat").with_uri("~/cat.jpg");
//!     let outcome = engine.apply_action(&mut photo, ActionTier::Primary, "Poke").await?;
//!     println!("{:?}", outcome.description);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod describe;
pub mod engine;
pub mod error;
pub mod store;
pub mod types;

pub use catalog::{Action, ActionBoard, Rights, TierCatalog};
pub use config::Config;
pub use describe::{DescriptionService, DescriptionServiceFactory};
pub use engine::{EngineOptions, PhotoActionEngine, DURABILITY_COST};
pub use error::{
    ActionError, ConfigError, DuranceError, PersistenceError, RejectionReason, Result,
    ServiceError,
};
pub use store::{Gallery, JsonGalleryStore, MemoryGalleryStore, PersistenceClient, PhotoLock};
pub use types::{ActionOutcome, ActionTier, Description, Durability, Photo};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
