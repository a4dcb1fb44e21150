use serde::{Deserialize, Serialize};

/// A voice-guidance clip played at a fixed offset from session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceCue {
    /// Clip reference: a storage path or an already resolved URL.
    pub audio_ref: String,
    pub offset_seconds: f64,
}

impl GuidanceCue {
    pub fn new(audio_ref: impl Into<String>, offset_seconds: f64) -> Self {
        Self {
            audio_ref: audio_ref.into(),
            offset_seconds,
        }
    }

    /// Offset in whole milliseconds. Negative or NaN offsets fire immediately;
    /// offsets past `u64::MAX` ms (including `+inf`) saturate and never fire.
    pub fn offset_ms(&self) -> u64 {
        if self.offset_seconds.is_nan() || self.offset_seconds <= 0.0 {
            return 0;
        }
        // Float-to-int casts saturate.
        (self.offset_seconds * 1000.0).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_rounds_to_ms() {
        assert_eq!(GuidanceCue::new("a", 1.2345).offset_ms(), 1_235);
        assert_eq!(GuidanceCue::new("a", 0.0).offset_ms(), 0);
    }

    #[test]
    fn invalid_offsets_fire_immediately() {
        assert_eq!(GuidanceCue::new("a", -4.0).offset_ms(), 0);
        assert_eq!(GuidanceCue::new("a", f64::NAN).offset_ms(), 0);
        assert_eq!(GuidanceCue::new("a", f64::NEG_INFINITY).offset_ms(), 0);
    }

    #[test]
    fn infinite_offset_saturates() {
        assert_eq!(GuidanceCue::new("a", f64::INFINITY).offset_ms(), u64::MAX);
        assert_eq!(GuidanceCue::new("a", 1e300).offset_ms(), u64::MAX);
    }
}
