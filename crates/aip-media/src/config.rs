use std::sync::LazyLock;

use regex::Regex;

use crate::error::MediaError;

static CREDENTIALS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^cloudinary://([^:]+):([^@]+)@(.+)$").expect("valid regex")
});

/// Account credentials parsed from a `cloudinary://` URL.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[redacted]")
            .finish()
    }
}

impl MediaConfig {
    /// Parses `cloudinary://<api_key>:<api_secret>@<cloud_name>`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::InvalidCredentials`] when the URL does not match.
    pub fn from_url(url: &str) -> Result<Self, MediaError> {
        let caps = CREDENTIALS_URL
            .captures(url.trim())
            .ok_or(MediaError::InvalidCredentials)?;
        Ok(Self {
            api_key: caps[1].to_string(),
            api_secret: caps[2].to_string(),
            cloud_name: caps[3].to_string(),
        })
    }
}
