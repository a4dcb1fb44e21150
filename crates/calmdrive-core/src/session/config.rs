use serde::{Deserialize, Serialize};

use crate::breathing::PhaseDurations;
use crate::error::ValidationError;

/// Immutable parameters of one breathing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub exercise_id: String,
    pub duration_secs: u64,
    pub phase_durations: PhaseDurations,
}

impl SessionConfig {
    pub fn duration_ms(&self) -> u64 {
        self.duration_secs.saturating_mul(1000)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exercise_id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "exercise_id".into(),
                message: "must not be empty".into(),
            });
        }
        if self.duration_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "duration_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        self.phase_durations.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            exercise_id: "quick-calm".into(),
            duration_secs: 60,
            phase_durations: PhaseDurations::default(),
        }
    }

    #[test]
    fn valid_config() {
        assert!(config().validate().is_ok());
        assert_eq!(config().duration_ms(), 60_000);
    }

    #[test]
    fn rejects_empty_fields() {
        let mut c = config();
        c.duration_secs = 0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.exercise_id = "  ".into();
        assert!(c.validate().is_err());

        let mut c = config();
        c.phase_durations = PhaseDurations::from_secs(0, 0, 0);
        assert!(c.validate().is_err());
    }
}
