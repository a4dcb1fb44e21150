use std::time::Duration;

use chrono::Utc;
use clap::{Args, Subcommand};

use calmdrive_core::app_state::NoOrientationLock;
use calmdrive_core::storage::NewSession;
use calmdrive_core::{
    exercise_from_deep_link, find_exercise, AppState, AudioPlayer, BreathingSession, Config, Database,
    DrivingMonitor, Event, Exercise, GuidanceCue, MediaResolver, ObjectStorage, Orientation,
    PlaybackError, SessionState, SimulatedTelemetry,
};

use super::{media_resolver, CmdResult};

/// Simulated frame length, ms of session time.
const FRAME_MS: u64 = 100;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a breathing session, printing events as JSON lines
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Exercise id (defaults to `default_exercise` from config)
    #[arg(long, conflicts_with = "link")]
    exercise: Option<String>,
    /// Deep link selecting the exercise, e.g. "/?exercise=deep-focus"
    #[arg(long)]
    link: Option<String>,
    /// Override the session length in seconds
    #[arg(long)]
    seconds: Option<u64>,
    /// Clock speed multiplier; 0 runs as fast as possible
    #[arg(long, default_value = "1.0")]
    speed: f64,
    /// Run without voice guidance
    #[arg(long)]
    no_guidance: bool,
    /// Use stored cue paths as-is instead of resolving them to URLs
    #[arg(long)]
    offline: bool,
    /// Seed for the simulated driving feed
    #[arg(long)]
    seed: Option<u64>,
    /// Do not write the session to the session log
    #[arg(long)]
    no_record: bool,
}

/// Player that announces clips on the log instead of producing sound.
/// Clips are treated as instantaneous.
#[derive(Default)]
struct ConsolePlayer {
    loaded: Option<String>,
}

impl AudioPlayer for ConsolePlayer {
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
        match self.loaded {
            Some(ref src) => {
                tracing::info!(src = %src, "playing clip");
                Ok(())
            }
            None => Err(PlaybackError::Rejected("nothing loaded".into())),
        }
    }

    fn stop(&mut self) {}

    fn rewind(&mut self) {}

    fn is_playing(&self) -> bool {
        false
    }
}

pub fn run(action: SessionAction) -> CmdResult {
    match action {
        SessionAction::Run(args) => run_session(args),
    }
}

fn pick_exercise(args: &RunArgs, config: &Config) -> Result<Exercise, String> {
    if let Some(ref link) = args.link {
        return exercise_from_deep_link(link).ok_or_else(|| format!("no exercise in link: {link}"));
    }
    let id = args.exercise.as_deref().unwrap_or(&config.default_exercise);
    find_exercise(id).ok_or_else(|| format!("unknown exercise: {id}"))
}

/// Swap stored paths for delivery URLs, dropping cues that cannot be resolved.
async fn resolve_cues<S: ObjectStorage>(
    resolver: &MediaResolver<S>,
    bucket: &str,
    cues: &[GuidanceCue],
) -> Vec<GuidanceCue> {
    let mut resolved = Vec::with_capacity(cues.len());
    for cue in cues {
        if let Some(url) = resolver.resolve_or_skip(bucket, &cue.audio_ref).await {
            resolved.push(GuidanceCue::new(url.as_str(), cue.offset_seconds));
        }
    }
    resolved
}

fn emit(event: &Event) -> CmdResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn ensure_user_id(config: &mut Config) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(ref id) = config.user_id {
        return Ok(id.clone());
    }
    let id = uuid::Uuid::new_v4().to_string();
    config.user_id = Some(id.clone());
    config.save()?;
    Ok(id)
}

fn run_session(args: RunArgs) -> CmdResult {
    if !args.speed.is_finite() || args.speed < 0.0 {
        return Err(format!("invalid speed: {}", args.speed).into());
    }
    let frame_delay = if args.speed > 0.0 {
        let delay = Duration::try_from_secs_f64(FRAME_MS as f64 / 1000.0 / args.speed)
            .map_err(|_| format!("invalid speed: {}", args.speed))?;
        Some(delay)
    } else {
        None
    };

    let mut config = Config::load()?;
    let exercise = pick_exercise(&args, &config)?;

    // A terminal has no orientation lock; the request degrades to unlocked.
    let mut app = AppState::new(config.ui.theme);
    if config.ui.lock_landscape {
        app.lock_orientation(&mut NoOrientationLock, Orientation::Landscape);
    }
    tracing::debug!(theme = ?app.theme(), orientation = %app.orientation(), "display state");

    let mut session_config = exercise.session_config();
    if let Some(seconds) = args.seconds {
        session_config.duration_secs = seconds;
    }

    let guidance_enabled = config.guidance.enabled && !args.no_guidance;
    let cues = if !guidance_enabled || args.offline {
        exercise.cues.clone()
    } else {
        let resolver = media_resolver(&config)?;
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(resolve_cues(&resolver, &config.media.audio_bucket, &exercise.cues))
    };

    let mut session = BreathingSession::new(ConsolePlayer::default());
    session.set_guidance_enabled(guidance_enabled);

    let mut monitor = config.driving.detection_enabled.then(|| {
        let telemetry = SimulatedTelemetry::new(args.seed)
            .with_change_probability(config.driving.change_probability)
            .with_max_velocity(config.driving.max_velocity_kmh);
        DrivingMonitor::new(telemetry)
            .with_interval_ms(config.driving.sample_interval_ms())
            .with_threshold_kmh(config.driving.driving_threshold_kmh)
    });

    let started_at = Utc::now();
    let mut now_ms = 0;
    for event in session.start(session_config, &cues, now_ms)? {
        emit(&event)?;
    }

    while session.state() != SessionState::Completed {
        now_ms += FRAME_MS;
        if let Some(delay) = frame_delay {
            std::thread::sleep(delay);
        }
        if let Some(event) = monitor.as_mut().and_then(|m| m.tick_at(now_ms)) {
            emit(&event)?;
        }
        for event in session.tick_at(now_ms) {
            emit(&event)?;
        }
    }

    if args.no_record {
        return Ok(());
    }

    let user_id = ensure_user_id(&mut config)?;
    let db = Database::open()?;
    let id = db.record_session(&NewSession {
        user_id: Some(&user_id),
        exercise_id: &exercise.id,
        duration_secs: session.elapsed_ms() / 1000,
        completed: true,
        cycles: session.cycles(),
        started_at,
        ended_at: Utc::now(),
    })?;
    tracing::info!(id, exercise = %exercise.id, "session recorded");
    Ok(())
}
