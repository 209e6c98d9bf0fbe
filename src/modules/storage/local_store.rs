//! Filesystem storage for uploaded road photos
//!
//! Files are written to a single directory under a sanitized name prefixed
//! with the UTC upload time. Existing files are never overwritten.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::core::error::AppError;
use crate::shared::constants::ALLOWED_EXTENSIONS;

lazy_static! {
    /// Characters that may not appear in a stored filename
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// How many suffixed names to try before giving up on a colliding upload
const MAX_NAME_ATTEMPTS: u32 = 100;

/// An image written to the store
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Name under which the image can be retrieved
    pub filename: String,
    pub size: usize,
}

/// An image read back from the store
#[derive(Debug)]
pub struct ImageFile {
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the upload directory if needed
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!("Image store initialized at {}", root.display());
        Ok(Self { root })
    }

    /// Check whether an uploaded filename carries an accepted image extension
    pub fn is_allowed(filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Content type served for a stored filename
    pub fn content_type_for(filename: &str) -> Option<&'static str> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            _ => None,
        }
    }

    /// Write an uploaded image under a fresh, timestamp-prefixed name
    pub async fn save(&self, original_filename: &str, data: &[u8]) -> Result<StoredImage, AppError> {
        self.save_at(original_filename, data, Utc::now()).await
    }

    async fn save_at(
        &self,
        original_filename: &str,
        data: &[u8],
        now: DateTime<Utc>,
    ) -> Result<StoredImage, AppError> {
        if !Self::is_allowed(original_filename) {
            return Err(AppError::Validation(format!(
                "File type of '{}' is not allowed. Allowed types: {}",
                original_filename,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let base = secure_filename(&format!(
            "{}_{}",
            now.format("%Y%m%d%H%M%S"),
            original_filename
        ));

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let filename = with_suffix(&base, attempt);
            let path = self.root.join(&filename);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Upload name '{}' taken, trying next suffix", filename);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            file.write_all(data).await?;
            file.flush().await?;

            debug!("Stored image '{}' ({} bytes)", filename, data.len());
            return Ok(StoredImage {
                filename,
                size: data.len(),
            });
        }

        Err(AppError::Internal(format!(
            "Could not find a free name for upload '{}'",
            base
        )))
    }

    /// Read a stored image back by the name returned from [`ImageStore::save`]
    pub async fn open(&self, filename: &str) -> Result<ImageFile, AppError> {
        let not_found = || AppError::NotFound(format!("File '{}' not found", filename));

        // Only names this store could have produced are served
        if filename.is_empty() || secure_filename(filename) != filename {
            return Err(not_found());
        }
        let content_type = Self::content_type_for(filename).ok_or_else(not_found)?;

        match tokio::fs::read(self.root.join(filename)).await {
            Ok(data) => Ok(ImageFile { data, content_type }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored image
    pub async fn remove(&self, filename: &str) -> Result<(), AppError> {
        tokio::fs::remove_file(self.root.join(filename)).await?;
        debug!("Removed image '{}'", filename);
        Ok(())
    }
}

/// Reduce an arbitrary client-supplied filename to a safe, flat name.
///
/// Accented letters are folded to ASCII (NFKD, combining marks dropped).
/// Path separators and whitespace collapse to `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and underscores are
/// trimmed, so the result can never escape the upload directory.
pub fn secure_filename(name: &str) -> String {
    let flattened: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn with_suffix(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, attempt, ext),
        None => format!("{}_{}", filename, attempt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_secure_filename_strips_paths_and_unsafe_chars() {
        assert_eq!(secure_filename("My cool photo.png"), "My_cool_photo.png");
        assert_eq!(secure_filename("../../etc/passwd.png"), "etc_passwd.png");
        assert_eq!(secure_filename("C:\\road\\hole.JPG"), "C_road_hole.JPG");
        assert_eq!(secure_filename("crack<1>?.jpeg"), "crack1.jpeg");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_secure_filename_folds_accents() {
        assert_eq!(secure_filename("café.png"), "cafe.png");
        assert_eq!(secure_filename("Straße Ünter.jpg"), "Strae_Unter.jpg");
        assert_eq!(secure_filename("道路.png"), "png");
    }

    #[test]
    fn test_is_allowed() {
        assert!(ImageStore::is_allowed("road.png"));
        assert!(ImageStore::is_allowed("road.JPG"));
        assert!(ImageStore::is_allowed("road.tar.jpeg"));
        assert!(!ImageStore::is_allowed("road.gif"));
        assert!(!ImageStore::is_allowed("road"));
        assert!(!ImageStore::is_allowed("png"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(ImageStore::content_type_for("a.png"), Some("image/png"));
        assert_eq!(ImageStore::content_type_for("a.JPEG"), Some("image/jpeg"));
        assert_eq!(ImageStore::content_type_for("a.gif"), None);
    }

    #[tokio::test]
    async fn test_save_uses_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).await.unwrap();

        let stored = store
            .save_at("pot hole.png", b"png-bytes", fixed_time())
            .await
            .unwrap();

        assert_eq!(stored.filename, "20240305140709_pot_hole.png");
        assert_eq!(stored.size, 9);
        let on_disk = std::fs::read(dir.path().join(&stored.filename)).unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[tokio::test]
    async fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).await.unwrap();

        let first = store.save_at("a.jpg", b"one", fixed_time()).await.unwrap();
        let second = store.save_at("a.jpg", b"two", fixed_time()).await.unwrap();

        assert_eq!(first.filename, "20240305140709_a.jpg");
        assert_eq!(second.filename, "20240305140709_a_1.jpg");
        assert_eq!(std::fs::read(dir.path().join(&first.filename)).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join(&second.filename)).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_save_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).await.unwrap();

        let result = store.save("anim.gif", b"GIF89a").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_open_round_trip_and_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("uploads")).await.unwrap();
        std::fs::write(dir.path().join("secret.png"), b"outside").unwrap();

        let stored = store.save("road.png", b"inside").await.unwrap();
        let file = store.open(&stored.filename).await.unwrap();
        assert_eq!(file.data, b"inside");
        assert_eq!(file.content_type, "image/png");

        assert!(matches!(
            store.open("../secret.png").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.open("missing.png").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).await.unwrap();

        let stored = store.save("road.jpeg", b"x").await.unwrap();
        store.remove(&stored.filename).await.unwrap();
        assert!(matches!(
            store.open(&stored.filename).await,
            Err(AppError::NotFound(_))
        ));
    }
}
