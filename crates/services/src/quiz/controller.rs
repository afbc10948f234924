use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{Country, CountryCode, GameMode, GameStatus};
use quiz_core::{AnswerMatcher, Clock};

use super::progress::{ProgressTracker, ProgressView};
use super::selection::{SelectionPolicy, SelectionState};
use super::view::{AnswerOutcome, QuizView, RunSummary};
use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Transient state of a running (or just finished) session.
#[derive(Debug, Clone)]
struct Session {
    mode: GameMode,
    region: Option<String>,
    state: SelectionState,
    score_this_run: usize,
    current: Option<Country>,
    started_at: DateTime<Utc>,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives the quiz state machine: `Menu -> [Selecting ->] Playing -> Finished | Menu`.
///
/// Intents run to completion one at a time (`&mut self`). Progress writes go
/// through the [`ProgressTracker`] and never roll back on storage failure.
pub struct SessionController {
    clock: Clock,
    pool: Arc<[Country]>,
    matcher: AnswerMatcher,
    selection: SelectionPolicy,
    progress: ProgressTracker,
    status: GameStatus,
    session: Option<Session>,
    custom: BTreeSet<CountryCode>,
    last_summary: Option<RunSummary>,
}

impl SessionController {
    #[must_use]
    pub fn new(pool: Arc<[Country]>, progress: ProgressTracker) -> Self {
        Self {
            clock: Clock::default(),
            pool,
            matcher: AnswerMatcher::with_builtin_aliases(),
            selection: SelectionPolicy::new(),
            progress,
            status: GameStatus::Menu,
            session: None,
            custom: BTreeSet::new(),
            last_summary: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: AnswerMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn mode(&self) -> Option<GameMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Country> {
        self.session.as_ref().and_then(|s| s.current.as_ref())
    }

    #[must_use]
    pub fn pool(&self) -> &[Country] {
        &self.pool
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    #[must_use]
    pub fn custom_selection(&self) -> &BTreeSet<CountryCode> {
        &self.custom
    }

    #[must_use]
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Distinct, sorted, non-empty regions present in the pool.
    #[must_use]
    pub fn regions(&self) -> Vec<String> {
        let regions: BTreeSet<&str> = self
            .pool
            .iter()
            .map(Country::region)
            .filter(|r| !r.is_empty())
            .collect();
        regions.into_iter().map(str::to_string).collect()
    }

    //
    // ─── CUSTOM SELECTION ──────────────────────────────────────────────────────
    //

    /// Enter custom pool curation with an empty selection.
    ///
    /// Only from `Menu`, `Finished` or `Selecting`; a running session is left untouched.
    pub fn begin_selection(&mut self) {
        if self.status.is_playing() {
            return;
        }
        self.session = None;
        self.custom.clear();
        self.status = GameStatus::Selecting;
    }

    /// Add or remove `code` from the custom pool. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCountry` if the code is not in the pool.
    pub fn toggle_custom(&mut self, code: &CountryCode) -> Result<bool, SessionError> {
        self.ensure_in_pool(code)?;
        if self.custom.remove(code) {
            Ok(false)
        } else {
            self.custom.insert(code.clone());
            Ok(true)
        }
    }

    /// Replace the custom pool.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCountry` for the first code not in the pool;
    /// the previous selection is kept in that case.
    pub fn set_custom_selection(
        &mut self,
        codes: impl IntoIterator<Item = CountryCode>,
    ) -> Result<(), SessionError> {
        let mut next = BTreeSet::new();
        for code in codes {
            self.ensure_in_pool(&code)?;
            next.insert(code);
        }
        self.custom = next;
        Ok(())
    }

    fn ensure_in_pool(&self, code: &CountryCode) -> Result<(), SessionError> {
        if self.pool.iter().any(|c| c.code() == code) {
            Ok(())
        } else {
            Err(SessionError::UnknownCountry(code.to_string()))
        }
    }

    //
    // ─── INTENTS ───────────────────────────────────────────────────────────────
    //

    /// Start a session. Blank regions mean "no filter".
    ///
    /// Custom mode plays the current custom selection. An empty effective pool
    /// finishes immediately.
    pub async fn start_game(&mut self, mode: GameMode, region: Option<&str>) {
        let region = region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        self.progress.clear_visited().await;
        let state = self
            .selection
            .start(&self.pool, mode, region.as_deref(), &self.custom);

        tracing::info!(
            %mode,
            region = region.as_deref().unwrap_or("all"),
            pool = state.total(),
            "starting session"
        );

        self.session = Some(Session {
            mode,
            region,
            state,
            score_this_run: 0,
            current: None,
            started_at: self.clock.now(),
        });
        self.last_summary = None;
        self.status = GameStatus::Playing;
        self.advance();
    }

    /// Check `raw` against the current country and advance on success.
    pub async fn submit_answer(&mut self, raw: &str) -> AnswerOutcome {
        let Some(session) = self.session.as_ref() else {
            return AnswerOutcome::Ignored;
        };
        let Some(current) = session.current.clone() else {
            return AnswerOutcome::Ignored;
        };
        let mode = session.mode;

        if !self.matcher.is_correct(&current, mode, raw) {
            tracing::debug!(code = %current.code(), "incorrect answer");
            self.progress.register_visited(current.code()).await;
            return AnswerOutcome::Incorrect;
        }

        tracing::debug!(code = %current.code(), "correct answer");
        match mode {
            GameMode::Capital => {
                self.bump_score();
                self.progress.register_visited(current.code()).await;
            }
            GameMode::Learning => {
                self.progress.register_correct(current.code()).await;
                self.progress.register_visited(current.code()).await;
            }
            GameMode::Survival | GameMode::Custom => self.bump_score(),
        }
        self.advance();

        AnswerOutcome::Correct {
            country: current,
            finished: self.status == GameStatus::Finished,
        }
    }

    /// Move past the current country without scoring. Returns the skipped one.
    pub async fn skip(&mut self) -> Option<Country> {
        let skipped = self.current()?.clone();
        self.progress.register_visited(skipped.code()).await;
        self.advance();
        Some(skipped)
    }

    /// The expected answer for the current country, without side effects.
    ///
    /// Capital mode yields the capitals joined by ", " (`None` if there are
    /// none); other modes yield the display name.
    #[must_use]
    pub fn reveal(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let current = session.current.as_ref()?;
        match session.mode {
            GameMode::Capital => {
                let capitals = current.capitals().join(", ");
                (!capitals.is_empty()).then_some(capitals)
            }
            GameMode::Learning | GameMode::Survival | GameMode::Custom => {
                Some(current.display_name().to_string())
            }
        }
    }

    pub fn return_to_menu(&mut self) {
        self.session = None;
        self.status = GameStatus::Menu;
    }

    /// Erase all persisted progress. The caller must have confirmed it.
    ///
    /// A running bounded session restarts with a fresh queue; a running
    /// learning session draws again from the now fully unknown pool.
    pub async fn reset_progress(&mut self) {
        tracing::info!("resetting progress");
        self.progress.reset().await;

        if !self.status.is_playing() {
            return;
        }
        let Some((mode, region)) = self.session.as_ref().map(|s| (s.mode, s.region.clone()))
        else {
            return;
        };
        match mode {
            GameMode::Learning => self.advance(),
            GameMode::Survival | GameMode::Capital | GameMode::Custom => {
                self.start_game(mode, region.as_deref()).await;
            }
        }
    }

    //
    // ─── DERIVED VALUES ────────────────────────────────────────────────────────
    //

    /// Score/total/visited figures for the active session, or overall mastery
    /// of the whole pool when no session is active.
    #[must_use]
    pub fn progress_view(&self) -> ProgressView {
        let known = self.progress.known();
        let visited = self.progress.visited();

        let learning = |pool: &[Country]| {
            let score = pool.iter().filter(|c| known.contains(c.code())).count();
            let seen = pool.iter().filter(|c| visited.contains(c.code())).count();
            ProgressView::new(score, pool.len(), seen)
        };

        match self.session.as_ref() {
            None => learning(&self.pool),
            Some(session) => match &session.state {
                SelectionState::Learning { pool } => learning(pool),
                SelectionState::Queue { queue, total } => ProgressView::new(
                    session.score_this_run,
                    *total,
                    total.saturating_sub(queue.len()),
                ),
            },
        }
    }

    #[must_use]
    pub fn view(&self) -> QuizView {
        QuizView {
            status: self.status,
            mode: self.mode(),
            region: self.session.as_ref().and_then(|s| s.region.clone()),
            current: self.current().cloned(),
            progress: self.progress_view(),
            known_count: self.progress.known().len(),
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn bump_score(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.score_this_run = session.score_this_run.saturating_add(1);
        }
    }

    fn advance(&mut self) {
        let known = self.progress.known();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match self.selection.pick_next(&mut session.state, &known) {
            Some(next) => {
                tracing::debug!(code = %next.code(), "next country");
                session.current = Some(next);
            }
            None => {
                session.current = None;
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        self.status = GameStatus::Finished;
        let view = self.progress_view();
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let summary = RunSummary {
            mode: session.mode,
            region: session.region.clone(),
            score: view.score,
            total: view.total,
            started_at: session.started_at,
            finished_at: self.clock.now(),
        };
        tracing::info!(
            mode = %summary.mode,
            score = summary.score,
            total = summary.total,
            "session finished"
        );
        self.last_summary = Some(summary);
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("status", &self.status)
            .field("mode", &self.mode())
            .field("pool_len", &self.pool.len())
            .field("current", &self.current().map(Country::code))
            .field("custom_len", &self.custom.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
