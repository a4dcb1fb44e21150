pub mod config;
pub mod driving;
pub mod exercise;
pub mod media;
pub mod session;
pub mod stats;

use calmdrive_core::{MediaError, MediaResolver, SupabaseStorage};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolver for the configured storage project.
pub fn media_resolver(
    config: &calmdrive_core::Config,
) -> Result<MediaResolver<SupabaseStorage>, MediaError> {
    let mut storage = SupabaseStorage::new(&config.media.storage_url)?;
    if let Some(ref key) = config.media.api_key {
        storage = storage.with_api_key(key.clone());
    }
    Ok(MediaResolver::new(storage))
}
