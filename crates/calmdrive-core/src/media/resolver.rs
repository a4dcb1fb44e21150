use url::Url;

use super::storage::ObjectStorage;
use crate::error::MediaError;

/// Object key for a stored relative path: its last `/`-separated segment.
///
/// Returns `None` when that segment is empty, `.` or `..`.
pub fn object_key(relative_path: &str) -> Option<&str> {
    relative_path
        .trim_start_matches('/')
        .rsplit('/')
        .next()
        .filter(|key| !matches!(*key, "" | "." | ".."))
}

pub struct MediaResolver<S: ObjectStorage> {
    storage: S,
}

impl<S: ObjectStorage> MediaResolver<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Map a stored path such as `/sounds/chime.mp3` to its public URL.
    ///
    /// # Errors
    ///
    /// `MediaError::EmptyKey` without contacting storage when the path has no
    /// final segment; otherwise whatever the storage lookup reports.
    pub async fn resolve(&self, bucket: &str, relative_path: &str) -> Result<Url, MediaError> {
        let key = object_key(relative_path).ok_or_else(|| MediaError::EmptyKey {
            path: relative_path.to_string(),
        })?;
        match self.storage.public_url(bucket, key).await {
            Ok(url) => Ok(url),
            Err(e) => {
                tracing::warn!(bucket, key, error = %e, "media resolution failed");
                Err(e)
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but a failure means "play without it".
    pub async fn resolve_or_skip(&self, bucket: &str, relative_path: &str) -> Option<Url> {
        match self.resolve(bucket, relative_path).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::info!(bucket, path = relative_path, error = %e, "skipping media");
                None
            }
        }
    }
}
