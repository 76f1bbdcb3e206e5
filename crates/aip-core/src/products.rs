use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::colors::ColorEntry;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
const VIDEO_EXTENSIONS: [&str; 8] = [
    ".mp4", ".webm", ".ogg", ".avi", ".mov", ".wmv", ".flv", ".mkv",
];

/// A catalog product as the storefront sees it.
///
/// `colors` is always structured here; the delimited string form exists only
/// at the storage boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub description: String,
    pub short_description: String,
    pub price: Decimal,
    pub is_sale: bool,
    /// Only meaningful while `is_sale` is set.
    pub sales_price: Decimal,
    pub stock_quantity: i32,
    /// Set by admins; not derived from `stock_quantity`.
    pub is_in_stock: bool,
    /// Advisory only.
    pub low_stock_threshold: i32,
    /// Free text, e.g. `"M"` or `"S, M, L"`.
    pub size: String,
    pub images: Vec<String>,
    pub colors: Vec<ColorEntry>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The first entry in `images` with a known image extension.
    ///
    /// Video URLs and extensionless URLs are skipped, so this is not
    /// necessarily `images[0]`.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .map(String::as_str)
            .find(|url| has_image_extension(url))
    }

    /// The price a shopper pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        if self.is_sale {
            self.sales_price
        } else {
            self.price
        }
    }

    /// `images` labelled by kind, in stored order.
    #[must_use]
    pub fn media(&self) -> Vec<MediaItem> {
        self.images
            .iter()
            .map(|url| MediaItem {
                url: url.clone(),
                kind: if is_video_url(url) {
                    MediaKind::Video
                } else {
                    MediaKind::Image
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub kind: MediaKind,
}

/// `true` when the URL's path ends in one of the known image extensions.
/// Query strings and fragments are ignored.
#[must_use]
pub fn has_image_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// `true` when the URL mentions a video container extension anywhere.
#[must_use]
pub fn is_video_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

/// Input for creating a product from the admin form.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub product_name: String,
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub sales_price: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_in_stock")]
    pub is_in_stock: bool,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    #[serde(alias = "Size")]
    pub size: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<ColorEntry>,
}

/// Sparse update for an existing product. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<Decimal>,
    pub is_sale: Option<bool>,
    pub sales_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub is_in_stock: Option<bool>,
    pub low_stock_threshold: Option<i32>,
    #[serde(alias = "Size")]
    pub size: Option<String>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<ColorEntry>>,
}

fn default_in_stock() -> bool {
    true
}

fn default_low_stock_threshold() -> i32 {
    5
}
