//! Cross-process lock on one photo, held by a marker file.

use crate::error::PersistenceError;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Exclusive claim on a photo shared by every process using the same data
/// directory. The marker file is removed on drop.
///
/// A marker older than `stale_after` is assumed to belong to a process that
/// died mid-action and is taken over.
#[derive(Debug)]
pub struct PhotoLock {
    path: PathBuf,
}

impl PhotoLock {
    /// Claim `photo_id` under `dir`. `Ok(None)` means another holder is active.
    pub fn acquire(
        dir: &Path,
        photo_id: &str,
        stale_after: Duration,
    ) -> Result<Option<Self>, PersistenceError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.lock", file_stem(photo_id)));

        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    writeln!(file, "{}", std::process::id())?;
                    return Ok(Some(Self { path }));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if !is_stale(&path, stale_after) {
                        return Ok(None);
                    }
                    tracing::warn!("Removing stale lock {}", path.display());
                    match std::fs::remove_file(&path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PhotoLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {e}", self.path.display());
        }
    }
}

fn is_stale(path: &Path, stale_after: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > stale_after)
}

fn file_stem(photo_id: &str) -> String {
    photo_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
