use clap::Subcommand;
use calmdrive_core::{
    builtin_exercises, exercise_from_deep_link, find_exercise, BreathingPhase, Exercise,
};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// List built-in exercises
    List {
        /// Print full JSON instead of one line per exercise
        #[arg(long)]
        json: bool,
    },
    /// Show one exercise by id or deep link
    Show {
        /// Exercise id (e.g. "quick-calm") or link (e.g. "/?exercise=deep-focus")
        target: String,
        /// Print full JSON instead of the phase breakdown
        #[arg(long)]
        json: bool,
    },
}

/// Phase lengths in whole seconds, e.g. "4-7-8".
fn pattern(exercise: &Exercise) -> String {
    BreathingPhase::ALL
        .iter()
        .map(|phase| (exercise.phases.duration_ms(*phase) / 1000).to_string())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn run(action: ExerciseAction) -> CmdResult {
    match action {
        ExerciseAction::List { json } => {
            let exercises = builtin_exercises();
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
            } else {
                for e in &exercises {
                    println!("{:<12} {:>4}s  {}  {}", e.id, e.duration_secs, pattern(e), e.label);
                }
            }
        }
        ExerciseAction::Show { target, json } => {
            let exercise = find_exercise(&target)
                .or_else(|| exercise_from_deep_link(&target))
                .ok_or_else(|| format!("unknown exercise: {target}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exercise)?);
            } else {
                println!("{} ({}), {}s", exercise.label, exercise.id, exercise.duration_secs);
                println!("{}", exercise.description);
                for phase in BreathingPhase::ALL {
                    let ms = exercise.phases.duration_ms(phase);
                    if ms > 0 {
                        println!("  {:<12} {:>2}s", phase.label(), ms / 1000);
                    }
                }
            }
        }
    }
    Ok(())
}
