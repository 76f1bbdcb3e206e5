use std::path::{Path, PathBuf};

use aip_media::{MediaClient, MediaConfig};
use clap::Args;

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub file: PathBuf,
    /// `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    #[arg(long, env = "CLOUDINARY_URL", hide_env_values = true)]
    pub media_url: String,
    #[arg(long, env = "AIP_MEDIA_API_BASE", default_value = "https://api.cloudinary.com")]
    pub api_base: String,
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

/// Best-effort MIME type from the file extension.
pub(crate) fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(mime)
}

/// # Errors
///
/// Returns an error if the credentials are malformed, the file cannot be
/// read, or the media service rejects the upload.
pub(crate) async fn run_upload(args: UploadArgs) -> anyhow::Result<()> {
    let config = MediaConfig::from_url(&args.media_url)?;
    let client = MediaClient::new(config, &args.api_base, args.timeout_secs)?;

    let bytes = tokio::fs::read(&args.file).await?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let url = client
        .upload(bytes, &file_name, content_type_for(&args.file))
        .await?;
    println!("{url}");
    Ok(())
}
