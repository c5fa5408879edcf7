//! File-backed gallery store (one JSON document per gallery).

use super::PersistenceClient;
use crate::error::PersistenceError;
use crate::types::Photo;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Gallery persisted as a JSON array of photo records.
///
/// Writes go to a sibling temp file that is renamed over the original, so a
/// crash mid-write leaves the previous gallery intact.
pub struct JsonGalleryStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonGalleryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<Photo>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let mut photos: Vec<Photo> = serde_json::from_slice(&bytes)?;
        for photo in &mut photos {
            photo.clamp();
        }
        Ok(photos)
    }

    async fn write(&self, photos: &[Photo]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(photos)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Saved {} photos to {}", photos.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl PersistenceClient for JsonGalleryStore {
    async fn update_percentage(
        &self,
        photo_id: &str,
        percentage: u8,
    ) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut photos = self.read().await?;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| PersistenceError::PhotoNotFound(photo_id.to_string()))?;
        photo.percentage = percentage;
        self.write(&photos).await
    }

    async fn load_gallery(&self) -> Result<Vec<Photo>, PersistenceError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn save_gallery(&self, photos: &[Photo]) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        self.write(photos).await
    }
}
