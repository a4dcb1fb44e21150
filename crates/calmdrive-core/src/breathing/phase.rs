use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathingPhase {
    pub const ALL: [BreathingPhase; 3] = [
        BreathingPhase::Inhale,
        BreathingPhase::Hold,
        BreathingPhase::Exhale,
    ];

    /// The phase that follows this one. Wraps from exhale back to inhale.
    pub fn next(self) -> Self {
        match self {
            BreathingPhase::Inhale => BreathingPhase::Hold,
            BreathingPhase::Hold => BreathingPhase::Exhale,
            BreathingPhase::Exhale => BreathingPhase::Inhale,
        }
    }

    /// Prompt shown to the user during this phase.
    pub fn label(self) -> &'static str {
        match self {
            BreathingPhase::Inhale => "Breathe in",
            BreathingPhase::Hold => "Hold",
            BreathingPhase::Exhale => "Breathe out",
        }
    }
}

impl fmt::Display for BreathingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BreathingPhase::Inhale => "inhale",
            BreathingPhase::Hold => "hold",
            BreathingPhase::Exhale => "exhale",
        };
        f.write_str(s)
    }
}

/// Per-phase durations in milliseconds. A zero duration skips the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub inhale_ms: u64,
    pub hold_ms: u64,
    pub exhale_ms: u64,
}

impl PhaseDurations {
    pub fn from_secs(inhale: u64, hold: u64, exhale: u64) -> Self {
        Self {
            inhale_ms: inhale.saturating_mul(1000),
            hold_ms: hold.saturating_mul(1000),
            exhale_ms: exhale.saturating_mul(1000),
        }
    }

    pub fn duration_ms(&self, phase: BreathingPhase) -> u64 {
        match phase {
            BreathingPhase::Inhale => self.inhale_ms,
            BreathingPhase::Hold => self.hold_ms,
            BreathingPhase::Exhale => self.exhale_ms,
        }
    }

    /// Length of one full inhale/hold/exhale cycle.
    pub fn cycle_ms(&self) -> u64 {
        self.inhale_ms
            .saturating_add(self.hold_ms)
            .saturating_add(self.exhale_ms)
    }

    /// Reject patterns with nothing to animate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cycle_ms() == 0 {
            return Err(ValidationError::InvalidValue {
                field: "phase_durations".into(),
                message: "at least one phase must have a non-zero duration".into(),
            });
        }
        Ok(())
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::from_secs(4, 4, 4)
    }
}

/// Sequences phases in inhale, hold, exhale order and counts completed cycles.
#[derive(Debug, Clone)]
pub struct PhaseCycle {
    durations: PhaseDurations,
    phase: BreathingPhase,
    cycle: u64,
}

impl PhaseCycle {
    pub fn new(durations: PhaseDurations) -> Self {
        let mut cycle = Self {
            durations,
            phase: BreathingPhase::Inhale,
            cycle: 0,
        };
        if durations.duration_ms(BreathingPhase::Inhale) == 0 && durations.cycle_ms() > 0 {
            cycle.advance();
            cycle.cycle = 0;
        }
        cycle
    }

    pub fn phase(&self) -> BreathingPhase {
        self.phase
    }

    /// Completed cycles so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    pub fn current_duration_ms(&self) -> u64 {
        self.durations.duration_ms(self.phase)
    }

    /// Move to the next phase with a non-zero duration.
    pub fn advance(&mut self) -> BreathingPhase {
        if self.durations.cycle_ms() == 0 {
            return self.phase;
        }
        loop {
            let next = self.phase.next();
            if next == BreathingPhase::Inhale {
                self.cycle += 1;
            }
            self.phase = next;
            if self.durations.duration_ms(next) > 0 {
                return next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_cycle_in_order() {
        let mut cycle = PhaseCycle::new(PhaseDurations::from_secs(4, 2, 6));
        assert_eq!(cycle.phase(), BreathingPhase::Inhale);
        assert_eq!(cycle.advance(), BreathingPhase::Hold);
        assert_eq!(cycle.advance(), BreathingPhase::Exhale);
        assert_eq!(cycle.cycle(), 0);
        assert_eq!(cycle.advance(), BreathingPhase::Inhale);
        assert_eq!(cycle.cycle(), 1);
    }

    #[test]
    fn zero_hold_is_skipped() {
        let mut cycle = PhaseCycle::new(PhaseDurations::from_secs(4, 0, 6));
        assert_eq!(cycle.advance(), BreathingPhase::Exhale);
        assert_eq!(cycle.advance(), BreathingPhase::Inhale);
    }

    #[test]
    fn zero_inhale_starts_on_next_phase() {
        let cycle = PhaseCycle::new(PhaseDurations::from_secs(0, 3, 5));
        assert_eq!(cycle.phase(), BreathingPhase::Hold);
        assert_eq!(cycle.cycle(), 0);
    }

    #[test]
    fn all_zero_is_invalid() {
        assert!(PhaseDurations::from_secs(0, 0, 0).validate().is_err());
        assert!(PhaseDurations::default().validate().is_ok());
    }

    #[test]
    fn cycle_length() {
        assert_eq!(PhaseDurations::from_secs(4, 7, 8).cycle_ms(), 19_000);
    }
}
