use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid media credentials URL: expected cloudinary://<api_key>:<api_secret>@<cloud_name>")]
    InvalidCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected with HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("upload response has no secure_url")]
    MissingSecureUrl,

    #[error("JSON deserialization error for upload response: {0}")]
    Deserialize(#[source] serde_json::Error),
}
