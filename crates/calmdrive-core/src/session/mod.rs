mod config;
mod engine;

pub use config::SessionConfig;
pub use engine::{BreathingSession, SessionState};
