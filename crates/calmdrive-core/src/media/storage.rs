use reqwest::Client;
use url::Url;

use crate::error::MediaError;

/// Object-storage backend able to hand out public URLs.
#[allow(async_fn_in_trait)]
pub trait ObjectStorage {
    /// Public delivery URL for `key` in `bucket`.
    async fn public_url(&self, bucket: &str, key: &str) -> Result<Url, MediaError>;
}

/// Supabase Storage over its public-object REST path.
///
/// The URL is `{base}/storage/v1/object/public/{bucket}/{key}`; a `HEAD`
/// request confirms the object is actually served before it is handed out.
pub struct SupabaseStorage {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl SupabaseStorage {
    pub fn new(base_url: &str) -> Result<Self, MediaError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(MediaError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        // `join` replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: None,
        })
    }

    /// Send the project's anon key with lookups.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Public URL of `key` in `bucket`. Both are encoded as single path
    /// segments, so `?`, `#` and `/` inside a name stay part of it.
    ///
    /// # Errors
    ///
    /// `MediaError::EmptyKey` when either name is empty, `.` or `..`.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, MediaError> {
        if [bucket, key].iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(MediaError::EmptyKey {
                path: format!("{bucket}/{key}"),
            });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MediaError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["storage", "v1", "object", "public", bucket, key]);
        Ok(url)
    }
}

impl ObjectStorage for SupabaseStorage {
    async fn public_url(&self, bucket: &str, key: &str) -> Result<Url, MediaError> {
        let url = self.object_url(bucket, key)?;

        let mut request = self.client.head(url.clone());
        if let Some(ref api_key) = self.api_key {
            request = request.header("apikey", api_key);
        }
        let resp = request.send().await?;

        if !resp.status().is_success() {
            return Err(MediaError::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(url)
    }
}
