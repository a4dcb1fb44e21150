//! Theme and orientation state.
//!
//! One `AppState` is created by the shell and passed by reference to the
//! views that need it. All updates go through `&mut self` methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OrientationError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl FromStr for ThemePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("expected light, dark or system, got '{other}'"),
            }),
        }
    }
}

/// Concrete theme after resolving `System`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}

/// Device screen-orientation API.
pub trait OrientationLock {
    fn lock(&mut self, orientation: Orientation) -> Result<(), OrientationError>;
    fn unlock(&mut self);
}

/// For platforms without an orientation API.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOrientationLock;

impl OrientationLock for NoOrientationLock {
    fn lock(&mut self, _orientation: Orientation) -> Result<(), OrientationError> {
        Err(OrientationError::Unsupported)
    }

    fn unlock(&mut self) {}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    theme: ThemePreference,
    system_dark: bool,
    orientation: Orientation,
    locked_orientation: Option<Orientation>,
}

impl AppState {
    pub fn new(theme: ThemePreference) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn theme_preference(&self) -> ThemePreference {
        self.theme
    }

    /// The theme to render with.
    pub fn theme(&self) -> Theme {
        match self.theme {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::System if self.system_dark => Theme::Dark,
            ThemePreference::System => Theme::Light,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn locked_orientation(&self) -> Option<Orientation> {
        self.locked_orientation
    }

    pub fn set_theme(&mut self, theme: ThemePreference) {
        self.theme = theme;
    }

    /// Cycle light → dark → system.
    pub fn toggle_theme(&mut self) -> ThemePreference {
        self.theme = match self.theme {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        };
        self.theme
    }

    pub fn set_system_dark(&mut self, dark: bool) {
        self.system_dark = dark;
    }

    /// Record a viewport change. A locked orientation wins.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.orientation = self
            .locked_orientation
            .unwrap_or_else(|| Orientation::from_dimensions(width, height));
    }

    /// Ask the device to lock `orientation`.
    ///
    /// Failures are logged and leave the display unlocked; returns whether
    /// the lock took effect.
    pub fn lock_orientation(
        &mut self,
        device: &mut impl OrientationLock,
        orientation: Orientation,
    ) -> bool {
        match device.lock(orientation) {
            Ok(()) => {
                self.locked_orientation = Some(orientation);
                self.orientation = orientation;
                true
            }
            Err(e) => {
                tracing::warn!(%orientation, error = %e, "orientation lock failed; staying unlocked");
                self.locked_orientation = None;
                false
            }
        }
    }

    pub fn unlock_orientation(&mut self, device: &mut impl OrientationLock) {
        device.unlock();
        self.locked_orientation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyingLock;

    impl OrientationLock for DenyingLock {
        fn lock(&mut self, _orientation: Orientation) -> Result<(), OrientationError> {
            Err(OrientationError::Denied("user gesture required".into()))
        }
        fn unlock(&mut self) {}
    }

    #[derive(Default)]
    struct FakeLock {
        locked: Option<Orientation>,
    }

    impl OrientationLock for FakeLock {
        fn lock(&mut self, orientation: Orientation) -> Result<(), OrientationError> {
            self.locked = Some(orientation);
            Ok(())
        }
        fn unlock(&mut self) {
            self.locked = None;
        }
    }

    #[test]
    fn system_theme_follows_platform() {
        let mut state = AppState::new(ThemePreference::System);
        assert_eq!(state.theme(), Theme::Light);
        state.set_system_dark(true);
        assert_eq!(state.theme(), Theme::Dark);
        state.set_theme(ThemePreference::Light);
        assert_eq!(state.theme(), Theme::Light);
    }

    #[test]
    fn toggle_cycles_preferences() {
        let mut state = AppState::new(ThemePreference::Light);
        assert_eq!(state.toggle_theme(), ThemePreference::Dark);
        assert_eq!(state.toggle_theme(), ThemePreference::System);
        assert_eq!(state.toggle_theme(), ThemePreference::Light);
    }

    #[test]
    fn resize_tracks_orientation() {
        let mut state = AppState::default();
        state.on_resize(1280, 720);
        assert_eq!(state.orientation(), Orientation::Landscape);
        state.on_resize(720, 1280);
        assert_eq!(state.orientation(), Orientation::Portrait);
    }

    #[test]
    fn failed_lock_degrades_to_unlocked() {
        let mut state = AppState::default();
        assert!(!state.lock_orientation(&mut DenyingLock, Orientation::Landscape));
        assert_eq!(state.locked_orientation(), None);
        assert!(!state.lock_orientation(&mut NoOrientationLock, Orientation::Landscape));
        state.on_resize(720, 1280);
        assert_eq!(state.orientation(), Orientation::Portrait);
    }

    #[test]
    fn lock_overrides_resize_until_unlocked() {
        let mut state = AppState::default();
        let mut device = FakeLock::default();
        assert!(state.lock_orientation(&mut device, Orientation::Landscape));
        state.on_resize(720, 1280);
        assert_eq!(state.orientation(), Orientation::Landscape);

        state.unlock_orientation(&mut device);
        assert_eq!(device.locked, None);
        state.on_resize(720, 1280);
        assert_eq!(state.orientation(), Orientation::Portrait);
    }

    #[test]
    fn parse_theme() {
        assert_eq!("DARK".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("sepia".parse::<ThemePreference>().is_err());
    }
}
