use calmdrive_core::Database;

use super::CmdResult;

pub fn run(recent: usize) -> CmdResult {
    let db = Database::open()?;
    let stats = db.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    if recent > 0 {
        let sessions = db.recent_sessions(recent)?;
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    }
    Ok(())
}
