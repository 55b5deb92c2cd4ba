use std::path::PathBuf;

use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::fs;
use tracing::debug;

/// Content types accepted for profile images.
const ALLOWED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/gif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only PNG, JPEG and GIF images are allowed")]
    UnsupportedType,
    #[error("File is larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("failed to write uploaded file")]
    Io(#[from] std::io::Error),
}

/// Metadata for a file accepted by [`ImageStorage::store`].
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Name of the file inside the storage root.
    pub file_name: String,
    /// Root-relative path, suitable for the static `/images` route and for
    /// persisting on the user record.
    pub path: String,
}

/// Local-disk store for uploaded profile images. Files are write-once under
/// timestamp-prefixed names; nothing here ever deletes or overwrites.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStorage {
    pub fn new(root: PathBuf, max_bytes: usize) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, max_bytes })
    }

    /// Validate and persist one uploaded file, returning where it landed.
    pub async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredImage, UploadError> {
        if !ALLOWED_TYPES.contains(&content_type) {
            return Err(UploadError::UnsupportedType);
        }
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: data.len(),
                limit: self.max_bytes,
            });
        }

        let file_name = format!("{}-{}", unix_millis(), sanitize_file_name(original_name));
        let full_path = self.root.join(&file_name);
        fs::write(&full_path, &data).await?;

        debug!(path = %full_path.display(), bytes = data.len(), "stored image");
        Ok(StoredImage {
            path: full_path.to_string_lossy().into_owned(),
            file_name,
        })
    }
}

fn unix_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Keep only the final path component of the client-supplied name, reduced
/// to characters safe on any filesystem.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "upload".into()
    } else {
        cleaned
    }
}
