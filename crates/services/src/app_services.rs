use std::sync::Arc;

use quiz_core::model::Country;
use storage::repository::{ProgressKeys, Storage};

use crate::Clock;
use crate::catalog::{CountrySource, RestCountriesClient};
use crate::config::QuizConfig;
use crate::error::{AppServicesError, SessionError};
use crate::quiz::{ProgressTracker, SessionController};

/// Loading state of the country pool.
#[derive(Debug, Clone, Default)]
pub enum PoolState {
    #[default]
    NotLoaded,
    Ready(Arc<[Country]>),
    /// Retrieval failed; `load_pool` may be called again to retry.
    Failed { message: String },
}

impl PoolState {
    #[must_use]
    pub fn countries(&self) -> Option<&Arc<[Country]>> {
        match self {
            PoolState::Ready(pool) => Some(pool),
            PoolState::NotLoaded | PoolState::Failed { .. } => None,
        }
    }
}

/// Assembles storage, the country source and the quiz controller.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    source: Arc<dyn CountrySource>,
    keys: ProgressKeys,
    pool: PoolState,
}

impl AppServices {
    #[must_use]
    pub fn new(
        clock: Clock,
        storage: Storage,
        source: Arc<dyn CountrySource>,
        keys: ProgressKeys,
    ) -> Self {
        Self {
            clock,
            storage,
            source,
            keys,
            pool: PoolState::NotLoaded,
        }
    }

    /// Build services backed by `SQLite` storage and the REST country catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let source: Arc<dyn CountrySource> =
            Arc::new(RestCountriesClient::new(config.catalog.clone()));
        Ok(Self::new(
            clock,
            storage,
            source,
            config.progress_keys.clone(),
        ))
    }

    #[must_use]
    pub fn pool_state(&self) -> &PoolState {
        &self.pool
    }

    /// Fetch the country pool. Failures are kept as `PoolState::Failed`, never raised.
    pub async fn load_pool(&mut self) -> &PoolState {
        self.pool = match self.source.fetch_countries().await {
            Ok(countries) => {
                tracing::info!(countries = countries.len(), "country pool loaded");
                PoolState::Ready(countries.into())
            }
            Err(err) => {
                tracing::warn!(%err, "failed to load country pool");
                PoolState::Failed {
                    message: err.to_string(),
                }
            }
        };
        &self.pool
    }

    /// Controller over the loaded pool, with progress read from storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PoolUnavailable` (wrapped) if the pool is not
    /// loaded, or a storage error if progress cannot be read.
    pub async fn session_controller(&self) -> Result<SessionController, AppServicesError> {
        let pool = self
            .pool
            .countries()
            .cloned()
            .ok_or(SessionError::PoolUnavailable)?;
        let progress = self.progress_tracker().await?;
        Ok(SessionController::new(pool, progress).with_clock(self.clock))
    }

    /// Erase persisted progress without a running session.
    ///
    /// Stored sets are removed without being read, so unreadable data can
    /// always be cleared.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if a set cannot be removed.
    pub async fn reset_progress(&self) -> Result<(), AppServicesError> {
        for key in [&self.keys.known, &self.keys.visited] {
            self.storage.progress.clear_set(key).await?;
        }
        tracing::info!("progress erased");
        Ok(())
    }

    async fn progress_tracker(&self) -> Result<ProgressTracker, AppServicesError> {
        Ok(ProgressTracker::load(Arc::clone(&self.storage.progress), self.keys.clone()).await?)
    }
}
