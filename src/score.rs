//! Best-score persistence: one integer in the platform config directory.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::sinks::ScoreStore;

pub struct BestScoreFile {
    path: PathBuf,
}

impl BestScoreFile {
    /// Locates (and creates) the config directory for this game.
    pub fn new() -> io::Result<Self> {
        let dirs = ProjectDirs::from("", "", "flappy-term").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine config directory",
            )
        })?;
        fs::create_dir_all(dirs.config_dir())?;
        Ok(Self {
            path: dirs.config_dir().join("best_score"),
        })
    }
}

impl ScoreStore for BestScoreFile {
    fn load(&mut self) -> Option<u32> {
        let text = fs::read_to_string(&self.path).ok()?;
        text.trim().parse().ok()
    }

    fn save(&mut self, score: u32) {
        // A failed write costs the record, not the game.
        let _ = fs::write(&self.path, score.to_string());
    }
}
