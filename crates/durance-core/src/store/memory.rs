//! In-process gallery store.

use super::PersistenceClient;
use crate::error::PersistenceError;
use crate::types::Photo;
use async_trait::async_trait;
use std::sync::Mutex;

/// A gallery held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryGalleryStore {
    photos: Mutex<Vec<Photo>>,
}

impl MemoryGalleryStore {
    pub fn new(photos: Vec<Photo>) -> Self {
        Self {
            photos: Mutex::new(photos),
        }
    }

    /// Snapshot of the stored records.
    pub fn snapshot(&self) -> Vec<Photo> {
        self.photos
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PersistenceClient for MemoryGalleryStore {
    async fn update_percentage(
        &self,
        photo_id: &str,
        percentage: u8,
    ) -> Result<(), PersistenceError> {
        let mut photos = self
            .photos
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| PersistenceError::PhotoNotFound(photo_id.to_string()))?;
        photo.percentage = percentage;
        Ok(())
    }

    async fn load_gallery(&self) -> Result<Vec<Photo>, PersistenceError> {
        Ok(self.snapshot())
    }

    async fn save_gallery(&self, photos: &[Photo]) -> Result<(), PersistenceError> {
        *self
            .photos
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = photos.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_percentage() {
        let store = MemoryGalleryStore::new(vec![Photo::new("1", "a"), Photo::new("2", "b")]);
        store.update_percentage("2", 40).await.unwrap();
        let photos = store.load_gallery().await.unwrap();
        assert_eq!(photos[0].percentage, 100);
        assert_eq!(photos[1].percentage, 40);
    }

    #[tokio::test]
    async fn test_update_unknown_photo() {
        let store = MemoryGalleryStore::default();
        let err = store.update_percentage("9", 40).await.unwrap_err();
        assert!(matches!(err, PersistenceError::PhotoNotFound(id) if id == "9"));
    }
}
