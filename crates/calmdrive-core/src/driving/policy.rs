//! Interaction restriction policy.
//!
//! Gates UI interactions by complexity while the vehicle is moving.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::monitor::DrivingState;
use crate::error::ValidationError;

/// Velocity above which basic interactions are blocked while driving, km/h.
pub const BASIC_RESTRICT_KMH: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Multi-step or reading-heavy interactions (browsing, settings).
    Complex,
    /// Single taps such as picking an exercise.
    Basic,
    /// Safety-relevant controls (stop, mute). Never blocked.
    Essential,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionKind::Complex => "complex",
            InteractionKind::Basic => "basic",
            InteractionKind::Essential => "essential",
        };
        f.write_str(s)
    }
}

impl FromStr for InteractionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "complex" => Ok(InteractionKind::Complex),
            "basic" => Ok(InteractionKind::Basic),
            "essential" => Ok(InteractionKind::Essential),
            other => Err(ValidationError::InvalidValue {
                field: "interaction kind".into(),
                message: format!("expected complex, basic or essential, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestrictionPolicy {
    pub basic_limit_kmh: f64,
}

impl Default for RestrictionPolicy {
    fn default() -> Self {
        Self {
            basic_limit_kmh: BASIC_RESTRICT_KMH,
        }
    }
}

impl RestrictionPolicy {
    pub fn new(basic_limit_kmh: f64) -> Self {
        Self { basic_limit_kmh }
    }

    pub fn should_restrict(&self, state: &DrivingState, kind: InteractionKind) -> bool {
        if !state.is_driving {
            return false;
        }
        match kind {
            InteractionKind::Complex => true,
            InteractionKind::Basic => state.velocity > self.basic_limit_kmh,
            InteractionKind::Essential => false,
        }
    }
}

/// [`RestrictionPolicy::should_restrict`] with the default limits.
pub fn should_restrict(state: &DrivingState, kind: InteractionKind) -> bool {
    RestrictionPolicy::default().should_restrict(state, kind)
}
