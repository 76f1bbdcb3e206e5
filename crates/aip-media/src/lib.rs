//! Signed uploads to the hosted media service used for product images and
//! hero slides.

pub mod client;
pub mod config;
pub mod error;

pub use client::{sign_upload, MediaClient};
pub use config::MediaConfig;
pub use error::MediaError;
