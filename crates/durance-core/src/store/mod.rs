//! Gallery persistence.
//!
//! The engine only ever calls [`PersistenceClient::update_percentage`]; whole
//! gallery load/save is for the surrounding front end via [`Gallery`].

mod gallery;
mod json;
mod lock;
mod memory;

pub use gallery::Gallery;
pub use json::JsonGalleryStore;
pub use lock::PhotoLock;
pub use memory::MemoryGalleryStore;

use crate::error::PersistenceError;
use crate::types::Photo;
use async_trait::async_trait;

/// Durable storage for gallery photo records, keyed by photo id.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Durably write a new percentage for one photo.
    async fn update_percentage(
        &self,
        photo_id: &str,
        percentage: u8,
    ) -> Result<(), PersistenceError>;

    /// Load every photo record. An empty store yields an empty list.
    async fn load_gallery(&self) -> Result<Vec<Photo>, PersistenceError>;

    /// Replace the stored collection.
    async fn save_gallery(&self, photos: &[Photo]) -> Result<(), PersistenceError>;
}
