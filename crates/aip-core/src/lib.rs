pub mod app_config;
pub mod catalog;
pub mod colors;
pub mod config;
pub mod content;
pub mod passwords;
pub mod products;
pub mod validation;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{page_is_full, page_offset, CatalogFilters, CatalogQuery, ProductPage, PAGE_SIZE};
pub use colors::{decode_colors, encode_colors, ColorDecodeError, ColorEntry};
pub use config::{load_app_config, load_app_config_from_env};
pub use content::{Slide, SlideDraft, SlidePatch, Widget};
pub use passwords::{hash_password, verify_password, BcryptError, DEFAULT_COST};
pub use products::{MediaItem, MediaKind, Product, ProductDraft, ProductPatch};
pub use validation::{validate_widget_name, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
