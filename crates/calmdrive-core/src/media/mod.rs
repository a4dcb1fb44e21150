//! Media resolution: stored relative paths to public delivery URLs.

mod resolver;
mod storage;

pub use resolver::{object_key, MediaResolver};
pub use storage::{ObjectStorage, SupabaseStorage};
