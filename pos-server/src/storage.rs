//! Product image storage
//!
//! Validation runs synchronously in the request; the write itself goes
//! through an [`ImageUploader`] in the background.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted file extensions
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Stored images are re-encoded as JPEG at this quality
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("empty file")]
    Empty,

    #[error("no filename provided")]
    NoFilename,

    #[error("file too large: {0} bytes")]
    TooLarge(usize),

    #[error("unsupported file format '{0}'")]
    UnsupportedFormat(String),

    #[error("invalid image file: {0}")]
    InvalidImage(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Empty => AppError::new(ErrorCode::EmptyFile),
            UploadError::NoFilename => AppError::new(ErrorCode::NoFilename),
            UploadError::TooLarge(size) => AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large. Maximum size is {} bytes ({}MB)",
                    MAX_FILE_SIZE,
                    MAX_FILE_SIZE / 1024 / 1024
                ),
            )
            .with_detail("size", size),
            UploadError::UnsupportedFormat(ext) => AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!(
                    "Unsupported file format '{}'. Supported: {}",
                    ext,
                    SUPPORTED_FORMATS.join(", ")
                ),
            ),
            UploadError::InvalidImage(msg) => AppError::with_message(
                ErrorCode::InvalidImageFile,
                format!("Invalid image file: {msg}"),
            ),
            UploadError::Encode(_) | UploadError::Io(_) => {
                tracing::error!(error = %e, "Image storage failed");
                AppError::new(ErrorCode::FileStorageFailed)
            }
        }
    }
}

/// Check size, extension and decodability. Returns the lowercased extension.
pub fn validate_image(data: &[u8], filename: &str) -> Result<String, UploadError> {
    if filename.is_empty() {
        return Err(UploadError::NoFilename);
    }
    if data.is_empty() {
        return Err(UploadError::Empty);
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge(data.len()));
    }

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| UploadError::UnsupportedFormat(filename.to_string()))?;
    let is_image = mime_guess::from_ext(&ext)
        .first()
        .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) || !is_image {
        return Err(UploadError::UnsupportedFormat(ext));
    }

    image::load_from_memory(data).map_err(|e| UploadError::InvalidImage(e.to_string()))?;
    Ok(ext)
}

/// Destination for product images
#[async_trait]
pub trait ImageUploader: Send + Sync + 'static {
    /// Store an already validated image and return its public URL
    async fn upload(&self, data: Vec<u8>, original_name: &str) -> Result<String, UploadError>;
}

/// Writes images under a local directory served as static files
#[derive(Debug, Clone)]
pub struct LocalUploader {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalUploader {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

fn encode_jpeg(data: &[u8]) -> Result<Vec<u8>, UploadError> {
    let img = image::load_from_memory(data).map_err(|e| UploadError::InvalidImage(e.to_string()))?;
    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| UploadError::Encode(e.to_string()))?;
    Ok(buffer)
}

#[async_trait]
impl ImageUploader for LocalUploader {
    async fn upload(&self, data: Vec<u8>, original_name: &str) -> Result<String, UploadError> {
        let jpeg = tokio::task::spawn_blocking(move || encode_jpeg(&data))
            .await
            .map_err(|e| UploadError::Encode(e.to_string()))??;

        // Content-addressed: identical images share one file
        let filename = format!("{}.jpg", hex::encode(Sha256::digest(&jpeg)));
        let path = self.dir.join(&filename);

        tokio::fs::create_dir_all(&self.dir).await?;
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, &jpeg).await?;
        }

        tracing::info!(
            original_name = %original_name,
            stored_as = %filename,
            size = jpeg.len(),
            "Product image stored"
        );
        Ok(format!("{}/{}", self.url_prefix, filename))
    }
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}
