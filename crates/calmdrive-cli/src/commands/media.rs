use clap::Subcommand;
use calmdrive_core::Config;

use super::{media_resolver, CmdResult};

#[derive(Subcommand)]
pub enum MediaAction {
    /// Resolve a stored path to its public URL
    Resolve {
        /// Storage bucket (e.g. "audio")
        bucket: String,
        /// Stored relative path (e.g. "/sounds/chime.mp3")
        path: String,
    },
}

pub fn run(action: MediaAction) -> CmdResult {
    let config = Config::load()?;
    match action {
        MediaAction::Resolve { bucket, path } => {
            let resolver = media_resolver(&config)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let url = runtime.block_on(resolver.resolve(&bucket, &path))?;
            println!("{url}");
        }
    }
    Ok(())
}
