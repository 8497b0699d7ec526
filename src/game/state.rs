//! # Session State Module
//!
//! State that outlives a single game: the running game, the high score table
//! and play statistics.
//!
//! The high score table is the only persistent piece. It round-trips through
//! JSON, either as a string or a file on disk.

use super::{ActiveGame, GameKind, Minigame};
use crate::input::GameInput;
use crate::{ArcadeError, ArcadeResult, GenerationConfig, LldmClient};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Best score and play count per game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreTable {
    pub best: BTreeMap<GameKind, u64>,
    pub games_played: BTreeMap<GameKind, u32>,
}

impl HighScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished game. Returns true if it set a new best.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{GameKind, HighScoreTable};
    ///
    /// let mut table = HighScoreTable::new();
    /// assert!(table.record(GameKind::Runner, 40));
    /// assert!(!table.record(GameKind::Runner, 25));
    /// assert_eq!(table.best_score(GameKind::Runner), Some(40));
    /// assert_eq!(table.played(GameKind::Runner), 2);
    /// ```
    pub fn record(&mut self, kind: GameKind, score: u64) -> bool {
        *self.games_played.entry(kind).or_insert(0) += 1;
        match self.best.get(&kind) {
            Some(&best) if best >= score => false,
            _ => {
                self.best.insert(kind, score);
                true
            }
        }
    }

    pub fn best_score(&self, kind: GameKind) -> Option<u64> {
        self.best.get(&kind).copied()
    }

    pub fn played(&self, kind: GameKind) -> u32 {
        self.games_played.get(&kind).copied().unwrap_or(0)
    }

    /// Saves the table to JSON.
    pub fn save_to_json(&self) -> ArcadeResult<String> {
        serde_json::to_string_pretty(self).map_err(ArcadeError::from)
    }

    /// Loads a table from JSON.
    pub fn load_from_json(json: &str) -> ArcadeResult<Self> {
        serde_json::from_str(json).map_err(ArcadeError::from)
    }

    pub fn save_to_file(&self, path: &Path) -> ArcadeResult<()> {
        std::fs::write(path, self.save_to_json()?)?;
        Ok(())
    }

    /// Loads a table from disk. A missing file is an empty table.
    pub fn load_from_file(path: &Path) -> ArcadeResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        Self::load_from_json(&std::fs::read_to_string(path)?)
    }
}

/// Play statistics for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub games_started: u32,
    pub games_finished: u32,
    pub frames_played: u64,
    pub inputs_applied: u64,
    pub total_score: u64,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }
}

/// The running game plus everything that survives between games.
#[derive(Debug)]
pub struct Session {
    pub config: GenerationConfig,
    pub active: Option<ActiveGame>,
    pub scores: HighScoreTable,
    pub statistics: GameStatistics,
}

impl Session {
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_scores(config, HighScoreTable::new())
    }

    pub fn with_scores(config: GenerationConfig, scores: HighScoreTable) -> Self {
        Self {
            config,
            active: None,
            scores,
            statistics: GameStatistics::new(),
        }
    }

    /// Starts a game, abandoning any game in progress without recording it.
    pub fn start_game(&mut self, kind: GameKind) -> ArcadeResult<()> {
        self.start_game_with(kind, LldmClient::offline())
    }

    /// Starts a game whose generated content comes from `client`.
    pub fn start_game_with(&mut self, kind: GameKind, client: LldmClient) -> ArcadeResult<()> {
        self.active = Some(ActiveGame::start(kind, &self.config, client)?);
        self.statistics.games_started += 1;
        info!("Started {}", kind.title());
        Ok(())
    }

    fn game_mut(&mut self) -> ArcadeResult<&mut ActiveGame> {
        self.active
            .as_mut()
            .ok_or_else(|| ArcadeError::InvalidState("No game is running".to_string()))
    }

    pub fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        self.game_mut()?.apply_input(input)?;
        self.statistics.inputs_applied += 1;
        Ok(())
    }

    pub fn tick(&mut self) -> ArcadeResult<()> {
        self.game_mut()?.tick()?;
        self.statistics.frames_played += 1;
        Ok(())
    }

    pub fn restart(&mut self) -> ArcadeResult<()> {
        self.game_mut()?.restart()
    }

    /// Drops the running game without recording it.
    pub fn abandon_game(&mut self) -> Option<GameKind> {
        self.active.take().map(|game| game.kind())
    }

    /// Ends the running game and records its score.
    ///
    /// Returns the game and score, or None if nothing was running.
    pub fn finish_game(&mut self) -> Option<(GameKind, u64)> {
        let game = self.active.take()?;
        let (kind, score) = (game.kind(), game.score());
        if self.scores.record(kind, score) {
            info!("New best for {}: {}", kind.title(), score);
        }
        self.statistics.games_finished += 1;
        self.statistics.total_score += score;
        Some((kind, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{RacingInput, Racer};

    #[test]
    fn test_record_keeps_best() {
        let mut table = HighScoreTable::new();
        assert!(table.record(GameKind::Maze, 0));
        assert!(table.record(GameKind::Maze, 3));
        assert!(!table.record(GameKind::Maze, 2));
        assert_eq!(table.best_score(GameKind::Maze), Some(3));
        assert_eq!(table.played(GameKind::Maze), 3);
        assert_eq!(table.best_score(GameKind::Shooter), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut table = HighScoreTable::new();
        table.record(GameKind::Crawler, 260);
        table.record(GameKind::Racing, 7);
        let json = table.save_to_json().unwrap();
        assert!(json.contains("Crawler"));
        assert_eq!(HighScoreTable::load_from_json(&json).unwrap(), table);
    }

    #[test]
    fn test_bad_json_is_serde_error() {
        let result = HighScoreTable::load_from_json("{ not json");
        assert!(matches!(result, Err(ArcadeError::Serde(_))));
    }

    #[test]
    fn test_session_records_finished_game() {
        let mut session = Session::new(GenerationConfig::for_testing(3));
        assert!(session.tick().is_err());
        session.start_game(GameKind::Racing).unwrap();
        if let Some(ActiveGame::Racing(race)) = session.active.as_mut() {
            race.bar_position = 100.0;
        }
        session
            .apply_input(&GameInput::Racing(RacingInput::Hit(Racer::One)))
            .unwrap();
        session.tick().unwrap();
        assert_eq!(session.finish_game(), Some((GameKind::Racing, 1)));
        assert_eq!(session.scores.best_score(GameKind::Racing), Some(1));
        assert_eq!(session.statistics.frames_played, 1);
        assert_eq!(session.statistics.inputs_applied, 1);
        assert!(session.finish_game().is_none());
    }
}
