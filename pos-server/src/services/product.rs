//! Product catalog and background image writes

use shared::error::{AppError, ErrorCode};
use shared::models::{ImageStatus, Product};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db::products;
use crate::error::ServiceResult;
use crate::storage::{ImageUploader, validate_image};

/// Queue depth for pending image writes
pub const IMAGE_QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub price: i32,
    pub stock: i16,
    pub image: Option<ImageUpload>,
}

/// A validated image waiting to be written for `product_id`
#[derive(Debug)]
pub struct ImageJob {
    pub product_id: Uuid,
    pub filename: String,
    pub data: Vec<u8>,
}

pub fn parse_price(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|p| *p >= 0)
        .ok_or_else(|| AppError::new(ErrorCode::ProductInvalidPrice))
}

pub fn parse_stock(raw: &str) -> Result<i16, AppError> {
    raw.trim()
        .parse::<i16>()
        .map_err(|_| AppError::new(ErrorCode::ProductInvalidStock))
}

fn validate_name(name: &str) -> Result<(), AppError> {
    let len = name.chars().count();
    if len == 0 || len > 255 {
        return Err(AppError::validation("Name must be 1-255 characters").with_detail("name", len));
    }
    Ok(())
}

/// Store the product; an attached image is validated now and written later
pub async fn create(
    pool: &PgPool,
    image_jobs: &mpsc::Sender<ImageJob>,
    input: NewProduct,
) -> ServiceResult<Product> {
    validate_name(&input.name)?;
    if let Some(image) = &input.image {
        validate_image(&image.data, &image.filename).map_err(AppError::from)?;
    }

    let status = if input.image.is_some() {
        ImageStatus::Pending
    } else {
        ImageStatus::Default
    };
    let product = products::create(pool, input.name.trim(), input.price, input.stock, status).await?;
    tracing::info!(product_id = %product.id, name = %product.name, image_status = status.as_str(), "Product created");

    if let Some(image) = input.image {
        let job = ImageJob {
            product_id: product.id,
            filename: image.filename,
            data: image.data,
        };
        if image_jobs.send(job).await.is_err() {
            tracing::error!(product_id = %product.id, "Image worker unavailable, image dropped");
            products::set_image(pool, product.id, None, ImageStatus::Failed).await?;
        }
    }

    Ok(product)
}

pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Product>> {
    Ok(products::list(pool).await?)
}

pub async fn get(pool: &PgPool, id: Uuid) -> ServiceResult<Product> {
    products::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).into())
}

/// Write one image; returns the URL (if any) and the resulting status
async fn store_image(uploader: &dyn ImageUploader, job: ImageJob) -> (Option<String>, ImageStatus) {
    match uploader.upload(job.data, &job.filename).await {
        Ok(url) => (Some(url), ImageStatus::Uploaded),
        Err(e) => {
            tracing::error!(product_id = %job.product_id, error = %e, "Product image upload failed");
            (None, ImageStatus::Failed)
        }
    }
}

/// Drains the image queue, recording each outcome on the product
pub struct ImageUploadWorker {
    pool: PgPool,
    uploader: Arc<dyn ImageUploader>,
}

impl ImageUploadWorker {
    pub fn new(pool: PgPool, uploader: Arc<dyn ImageUploader>) -> Self {
        Self { pool, uploader }
    }

    /// Runs until the channel closes. On shutdown the queue is closed and
    /// already accepted jobs are still written.
    pub async fn run(self, mut rx: mpsc::Receiver<ImageJob>, shutdown: CancellationToken) {
        tracing::info!("Image upload worker started");
        loop {
            let job = tokio::select! {
                _ = shutdown.cancelled() => {
                    rx.close();
                    while let Some(job) = rx.recv().await {
                        self.handle(job).await;
                    }
                    break;
                }
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };
            self.handle(job).await;
        }
        tracing::info!("Image upload worker stopped");
    }

    async fn handle(&self, job: ImageJob) {
        let product_id = job.product_id;
        let (url, status) = store_image(self.uploader.as_ref(), job).await;
        if let Err(e) = products::set_image(&self.pool, product_id, url.as_deref(), status).await {
            tracing::error!(product_id = %product_id, error = %e, "Failed to record image status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalUploader, UploadError, sample_png};
    use async_trait::async_trait;

    struct BrokenUploader;

    #[async_trait]
    impl ImageUploader for BrokenUploader {
        async fn upload(&self, _data: Vec<u8>, _name: &str) -> Result<String, UploadError> {
            Err(UploadError::Io(std::io::Error::other("disk full")))
        }
    }

    fn job() -> ImageJob {
        ImageJob {
            product_id: Uuid::new_v4(),
            filename: "croissant.png".into(),
            data: sample_png(),
        }
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(" 15000 ").unwrap(), 15_000);
        assert_eq!(parse_price("0").unwrap(), 0);
        let err = parse_price("15k").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
        assert_eq!(err.message, "Invalid price format");
        assert!(parse_price("-1").is_err());
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("12").unwrap(), 12);
        assert_eq!(
            parse_stock("40000").unwrap_err().code,
            ErrorCode::ProductInvalidStock
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Croissant").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[tokio::test]
    async fn test_store_image_success() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = LocalUploader::new(dir.path(), "/public/uploads");
        let (url, status) = store_image(&uploader, job()).await;
        assert_eq!(status, ImageStatus::Uploaded);
        assert!(url.unwrap().starts_with("/public/uploads/"));
    }

    #[tokio::test]
    async fn test_store_image_failure_marks_failed() {
        let (url, status) = store_image(&BrokenUploader, job()).await;
        assert_eq!(status, ImageStatus::Failed);
        assert!(url.is_none());
    }
}
