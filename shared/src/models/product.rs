//! Product Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity
///
/// `stock` is the catalog figure entered at creation time. On-hand stock per
/// outlet is always derived from the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unit price in the smallest currency unit
    pub price: i32,
    pub stock: i16,
    pub image_url: Option<String>,
    /// See [`ImageStatus`]
    pub image_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Lifecycle of a product image upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// No image was supplied
    Default,
    /// Image accepted, background write in progress
    Pending,
    /// Image stored, `image_url` is set
    Uploaded,
    /// Background write failed
    Failed,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pending => "pending",
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }
}

/// Product category carried on transaction lines
///
/// Wire and storage representation is the numeric discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum ProductCategory {
    Goods = 1,
    Service = 2,
    Subscription = 3,
}

/// Returned for a category discriminant outside 1..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown product category: {0}")]
pub struct UnknownCategory(pub i64);

impl ProductCategory {
    /// Label used in the transaction report's category summary
    pub fn label(&self) -> &'static str {
        match self {
            Self::Goods => "Goods",
            Self::Service => "Service",
            Self::Subscription => "Subscription",
        }
    }

    /// Summary label for a stored discriminant; anything unknown is "Other"
    pub fn label_for(raw: i16) -> &'static str {
        Self::try_from(raw).map(|c| c.label()).unwrap_or("Other")
    }
}

impl From<ProductCategory> for u8 {
    fn from(c: ProductCategory) -> Self {
        c as u8
    }
}

impl From<ProductCategory> for i16 {
    fn from(c: ProductCategory) -> Self {
        c as i16
    }
}

impl TryFrom<u8> for ProductCategory {
    type Error = UnknownCategory;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i16::from(value))
    }
}

impl TryFrom<i16> for ProductCategory {
    type Error = UnknownCategory;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Goods),
            2 => Ok(Self::Service),
            3 => Ok(Self::Subscription),
            other => Err(UnknownCategory(other.into())),
        }
    }
}
