//! Best-score persistence
//!
//! One integer survives between sessions, stored as a small JSON envelope
//! under `~/.flip-runner/`. Loading is best-effort: a missing or corrupt
//! file reads as zero rather than faulting the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Save file name under the data directory
const BEST_SCORE_FILE: &str = "best_score.json";

/// JSON envelope for the save file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct BestScore {
    score: u64,
}

/// The `~/.flip-runner/` directory, created on demand
pub fn data_dir() -> io::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "could not determine home directory")
    })?;
    let dir = home.join(".flip-runner");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Read the persisted best score; 0 when absent or unreadable
pub fn load_best() -> u64 {
    match data_dir() {
        Ok(dir) => read_best_from(&dir.join(BEST_SCORE_FILE)),
        Err(e) => {
            log::warn!("no data dir for best score: {e}");
            0
        }
    }
}

/// Persist a new best score
pub fn save_best(score: u64) -> io::Result<()> {
    let path = data_dir()?.join(BEST_SCORE_FILE);
    write_best_to(&path, score)?;
    log::info!("best score saved: {score}");
    Ok(())
}

fn read_best_from(path: &Path) -> u64 {
    match fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str::<BestScore>(&json) {
            Ok(best) => best.score,
            Err(e) => {
                log::warn!("corrupt best score file, starting at 0: {e}");
                0
            }
        },
        Err(_) => 0,
    }
}

fn write_best_to(path: &Path, score: u64) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&BestScore { score })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}
