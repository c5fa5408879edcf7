//! Command implementations.

pub mod act;
pub mod config;
pub mod gallery;

use durance_core::{Config, Gallery, JsonGalleryStore, PersistenceClient};
use std::sync::Arc;

/// Open the file-backed gallery store from config.
pub(crate) fn open_store(config: &Config) -> Arc<dyn PersistenceClient> {
    let path = config.gallery_path();
    tracing::debug!("Gallery store: {}", path.display());
    Arc::new(JsonGalleryStore::new(path))
}

/// Load the gallery, seeding default slots on first use.
pub(crate) async fn load_gallery(
    store: Arc<dyn PersistenceClient>,
) -> anyhow::Result<Gallery> {
    Ok(Gallery::load_or_seed(store).await?)
}
