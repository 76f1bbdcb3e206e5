//! Homepage content managed from the back office: hero slides and curated
//! product widgets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::products::Product;

/// One entry of the rotating homepage hero banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub id: i64,
    pub image: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlideDraft {
    pub image: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlidePatch {
    pub image: Option<String>,
    pub label: Option<String>,
}

/// A named, admin-curated collection of products shown as a homepage
/// section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    pub widget_id: i64,
    pub widget_name: String,
    pub created_at: DateTime<Utc>,
    /// Members in the order they were added.
    pub products: Vec<Product>,
}
