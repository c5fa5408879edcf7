//! Gallery of photo slots backed by a [`PersistenceClient`].

use super::PersistenceClient;
use crate::error::PersistenceError;
use crate::types::Photo;
use std::sync::Arc;

const DEFAULT_SLOTS: usize = 9;
const SEED_PERCENTAGES: [u8; 3] = [30, 60, 90];
const SEED_COLORS: [&str; 3] = ["#ff6b6b", "#ffd93d", "#6bcf7f"];

/// The collection of photo slots a user picks from.
pub struct Gallery {
    store: Arc<dyn PersistenceClient>,
    photos: Vec<Photo>,
}

impl Gallery {
    /// The demo slots written on first launch.
    pub fn default_photos() -> Vec<Photo> {
        (0..DEFAULT_SLOTS)
            .map(|i| Photo {
                id: (i + 1).to_string(),
                uri: None,
                name: format!("Slot {}", i + 1),
                percentage: SEED_PERCENTAGES[i % SEED_PERCENTAGES.len()],
                color_tag: SEED_COLORS[i % SEED_COLORS.len()].to_string(),
            })
            .collect()
    }

    /// Load the stored gallery, seeding and saving the defaults when empty.
    pub async fn load_or_seed(store: Arc<dyn PersistenceClient>) -> Result<Self, PersistenceError> {
        let mut photos = store.load_gallery().await?;
        if photos.is_empty() {
            tracing::info!("No stored gallery, seeding {DEFAULT_SLOTS} default slots");
            photos = Self::default_photos();
            store.save_gallery(&photos).await?;
        }
        Ok(Self { store, photos })
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn get(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    /// Populate a slot with image bytes and persist the gallery.
    pub async fn assign(&mut self, id: &str, uri: &str) -> Result<&Photo, PersistenceError> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PersistenceError::PhotoNotFound(id.to_string()))?;

        self.photos[index].uri = Some(uri.to_string());
        self.store.save_gallery(&self.photos).await?;
        tracing::info!("Assigned {uri} to photo {id}");
        Ok(&self.photos[index])
    }

    /// Re-read records from the store, picking up writes made elsewhere.
    pub async fn refresh(&mut self) -> Result<(), PersistenceError> {
        self.photos = self.store.load_gallery().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGalleryStore;

    #[test]
    fn test_default_photos() {
        let photos = Gallery::default_photos();
        assert_eq!(photos.len(), 9);
        assert_eq!(photos[0].percentage, 30);
        assert_eq!(photos[1].percentage, 60);
        assert_eq!(photos[8].percentage, 90);
        assert!(photos.iter().all(|p| p.uri.is_none()));
    }

    #[tokio::test]
    async fn test_load_or_seed_saves_defaults() {
        let store = Arc::new(MemoryGalleryStore::default());
        let gallery = Gallery::load_or_seed(store.clone()).await.unwrap();
        assert_eq!(gallery.photos().len(), 9);
        assert_eq!(store.snapshot().len(), 9);
    }

    #[tokio::test]
    async fn test_load_keeps_existing_gallery() {
        let store = Arc::new(MemoryGalleryStore::new(vec![Photo::new("x", "mine")]));
        let gallery = Gallery::load_or_seed(store).await.unwrap();
        assert_eq!(gallery.photos().len(), 1);
        assert!(gallery.get("x").is_some());
    }

    #[tokio::test]
    async fn test_assign_persists_uri() {
        let store = Arc::new(MemoryGalleryStore::default());
        let mut gallery = Gallery::load_or_seed(store.clone()).await.unwrap();
        let photo = gallery.assign("3", "/tmp/three.jpg").await.unwrap();
        assert!(photo.is_assigned());
        assert_eq!(store.snapshot()[2].uri.as_deref(), Some("/tmp/three.jpg"));
    }

    #[tokio::test]
    async fn test_assign_unknown_slot() {
        let store = Arc::new(MemoryGalleryStore::default());
        let mut gallery = Gallery::load_or_seed(store).await.unwrap();
        assert!(gallery.assign("42", "/tmp/x.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_sees_percentage_updates() {
        let store = Arc::new(MemoryGalleryStore::default());
        let mut gallery = Gallery::load_or_seed(store.clone()).await.unwrap();
        store.update_percentage("2", 45).await.unwrap();
        gallery.refresh().await.unwrap();
        assert_eq!(gallery.get("2").unwrap().percentage, 45);
    }
}
