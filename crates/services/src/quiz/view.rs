use chrono::{DateTime, Duration, Utc};

use quiz_core::model::{Country, GameMode, GameStatus};

use super::progress::ProgressView;

/// Result of submitting a guess.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// No country was being asked; nothing happened.
    Ignored,
    /// The guess matched `country`. `finished` is set when that was the last one.
    Correct { country: Country, finished: bool },
    /// The guess did not match; the same country is still current.
    Incorrect,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, AnswerOutcome::Correct { .. })
    }
}

/// Recap of a session that ran to exhaustion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: GameMode,
    pub region: Option<String>,
    pub score: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// Presentation-agnostic snapshot of the quiz.
///
/// No pre-formatted strings; the front end decides how to render.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub status: GameStatus,
    pub mode: Option<GameMode>,
    pub region: Option<String>,
    pub current: Option<Country>,
    pub progress: ProgressView,
    /// Size of the whole known set, regardless of region.
    pub known_count: usize,
}
