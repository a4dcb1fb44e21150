//! Audio output seam.
//!
//! The guidance scheduler is the only component allowed to drive the player;
//! it takes ownership of it at construction.

use std::collections::HashSet;

use crate::error::PlaybackError;

pub trait AudioPlayer {
    /// Point the player at a new clip.
    fn load(&mut self, src: &str) -> Result<(), PlaybackError>;

    /// Start playback of the loaded clip.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Halt playback. No-op when nothing is playing.
    fn stop(&mut self);

    /// Seek back to the start of the loaded clip.
    fn rewind(&mut self);

    fn is_playing(&self) -> bool;
}

/// In-memory player that records what it was asked to do.
///
/// Clips keep "playing" until [`RecordingPlayer::finish`] is called, which
/// lets callers model clip length explicitly.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    loaded: Option<String>,
    playing: bool,
    plays: Vec<String>,
    stops: usize,
    failing: HashSet<String>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `play()` of `src` fail.
    pub fn fail_on(mut self, src: impl Into<String>) -> Self {
        self.failing.insert(src.into());
        self
    }

    /// Clips successfully started, in order.
    pub fn plays(&self) -> &[String] {
        &self.plays
    }

    pub fn stops(&self) -> usize {
        self.stops
    }

    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    /// The current clip reached its end.
    pub fn finish(&mut self) {
        self.playing = false;
    }
}

impl AudioPlayer for RecordingPlayer {
    fn load(&mut self, src: &str) -> Result<(), PlaybackError> {
        if src.is_empty() {
            return Err(PlaybackError::Load {
                src: src.to_string(),
                message: "empty source".into(),
            });
        }
        self.loaded = Some(src.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let src = self
            .loaded
            .clone()
            .ok_or_else(|| PlaybackError::Rejected("nothing loaded".into()))?;
        if self.failing.contains(&src) {
            return Err(PlaybackError::Rejected(format!("media error for {src}")));
        }
        self.playing = true;
        self.plays.push(src);
        Ok(())
    }

    fn stop(&mut self) {
        if self.playing {
            self.stops += 1;
        }
        self.playing = false;
    }

    fn rewind(&mut self) {}

    fn is_playing(&self) -> bool {
        self.playing
    }
}
