//! Per-game metric logging: newline-delimited JSON under `--log-dir`.
//!
//! One record per move (player, chosen move, belief, sight array where
//! applicable) so a game can be replayed or plotted after the fact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct MoveRecord {
    pub player: String,
    pub mv: u8,
    pub belief: Vec<f64>,
    pub sight_array: Option<Vec<u8>>,
}

/// Accumulates one game's moves for later serialization to ndjson.
#[derive(Clone, Debug)]
pub struct GameLog {
    game_number: usize,
    pub moves: Vec<MoveRecord>,
}

impl GameLog {
    pub fn new(game_number: usize) -> Self {
        Self {
            game_number,
            moves: Vec::new(),
        }
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    /// Write one line of JSON per recorded move to `<dir>/game_<n>.ndjson`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
        let path = dir.join(format!("game_{}.ndjson", self.game_number));

        let mut body = String::new();
        for record in &self.moves {
            let line = serde_json::to_string(record).context("serializing move record")?;
            body.push_str(&line);
            body.push('\n');
        }
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
