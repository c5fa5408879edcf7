//! Image sources: loading references into base64 payloads.
//!
//! Accepts plain paths, `file://` URIs and `http(s)://` URLs.

use crate::error::ServiceError;
use base64::Engine;
use image::ImageFormat;
use std::path::PathBuf;

/// Base64-encoded image ready to send to a hosted model.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Encode raw bytes, sniffing the MIME type from the content.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let media_type = match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => "image/png",
            Ok(ImageFormat::WebP) => "image/webp",
            Ok(ImageFormat::Gif) => "image/gif",
            Ok(ImageFormat::Jpeg) => "image/jpeg",
            other => {
                tracing::warn!("Unrecognized image format ({other:?}), defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Read the bytes behind an image reference and encode them.
    pub async fn load(image_ref: &str, client: &reqwest::Client) -> Result<Self, ServiceError> {
        let bytes = if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            fetch(image_ref, client).await?
        } else {
            let path = local_path(image_ref);
            tokio::fs::read(&path).await.map_err(|e| ServiceError::Image {
                message: format!("{}: {e}", path.display()),
            })?
        };

        if bytes.is_empty() {
            return Err(ServiceError::Image {
                message: format!("{image_ref} is empty"),
            });
        }

        Ok(Self::from_bytes(&bytes))
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

fn local_path(image_ref: &str) -> PathBuf {
    let raw = image_ref.strip_prefix("file://").unwrap_or(image_ref);
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

async fn fetch(url: &str, client: &reqwest::Client) -> Result<Vec<u8>, ServiceError> {
    let resp = client.get(url).send().await.map_err(|e| ServiceError::Image {
        message: format!("{url}: {e}"),
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ServiceError::Image {
            message: format!("{url}: HTTP {status}"),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| ServiceError::Image {
        message: format!("{url}: {e}"),
    })?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_from_bytes_sniffs_png() {
        let input = ImageInput::from_bytes(PNG_HEADER);
        assert_eq!(input.media_type, "image/png");
        assert!(!input.data.is_empty());
    }

    #[test]
    fn test_from_bytes_defaults_to_jpeg() {
        let input = ImageInput::from_bytes(&[1, 2, 3]);
        assert_eq!(input.media_type, "image/jpeg");
    }

    #[test]
    fn test_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3]);
        assert!(input.data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_file_uri_maps_to_path() {
        assert_eq!(local_path("file:///tmp/a.jpg"), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(local_path("/tmp/b.png"), PathBuf::from("/tmp/b.png"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PNG_HEADER).unwrap();
        let uri = format!("file://{}", file.path().display());

        let input = ImageInput::load(&uri, &reqwest::Client::new()).await.unwrap();
        assert_eq!(input.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_image_error() {
        let err = ImageInput::load("/definitely/not/here.jpg", &reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Image { .. }));
    }

    #[tokio::test]
    async fn test_load_empty_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ImageInput::load(&file.path().to_string_lossy(), &reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
