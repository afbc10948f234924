use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Unbounded mastery mode: draws unknown countries until all are known.
    #[default]
    Learning,
    /// One pass over a shuffled pool, name the country.
    Survival,
    /// One pass over a shuffled pool, name the capital.
    Capital,
    /// One pass over a hand-picked pool.
    Custom,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Learning,
        GameMode::Survival,
        GameMode::Capital,
        GameMode::Custom,
    ];

    /// Bounded modes run over a precomputed queue with a run-scoped score.
    #[must_use]
    pub fn is_bounded(self) -> bool {
        match self {
            GameMode::Learning => false,
            GameMode::Survival | GameMode::Capital | GameMode::Custom => true,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Learning => "learning",
            GameMode::Survival => "survival",
            GameMode::Capital => "capital",
            GameMode::Custom => "custom",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown game mode: {0}")]
pub struct GameModeParseError(pub String);

impl FromStr for GameMode {
    type Err = GameModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| GameModeParseError(s.to_string()))
    }
}

/// Lifecycle of the quiz: `Menu -> [Selecting ->] Playing -> Finished | Menu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Menu,
    /// Custom mode pool curation, before play starts.
    Selecting,
    Playing,
    Finished,
}

impl GameStatus {
    #[must_use]
    pub fn is_playing(self) -> bool {
        matches!(self, GameStatus::Playing)
    }
}
