use std::path::Path;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;

/// 10 MiB; larger files are refused before anything is sent.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("El archivo debe ser una imagen")]
    InvalidType,
    #[error("La imagen es demasiado grande. Máximo 10MB permitido.")]
    TooLarge,
}

/// A photo picked by the user, held only for the current analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl SelectedImage {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk; the MIME type comes from its extension.
    ///
    /// Files over [`MAX_IMAGE_BYTES`] fail with [`ImageError::TooLarge`]
    /// without being read.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("stat image {}", path.display()))?;
        if meta.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge.into());
        }
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read image {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_from_ext)
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn validate(&self) -> Result<(), ImageError> {
        if !self.is_image() {
            return Err(ImageError::InvalidType);
        }
        if self.size() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge);
        }
        Ok(())
    }

    /// `data:<mime>;base64,<payload>`, after validation.
    pub fn to_data_url(&self) -> Result<String, ImageError> {
        self.validate()?;
        Ok(format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes)))
    }
}

fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
