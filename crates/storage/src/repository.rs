use async_trait::async_trait;
use quiz_core::model::CountryCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage names for the two persisted progress sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressKeys {
    pub known: String,
    pub visited: String,
}

impl Default for ProgressKeys {
    fn default() -> Self {
        Self {
            known: "known-countries".into(),
            visited: "visited-countries".into(),
        }
    }
}

/// Persistence port for sets of country codes, stored as ordered lists.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored value cannot be decoded.
    /// A missing key is `Ok(None)`, not an error.
    async fn load_set(&self, key: &str) -> Result<Option<Vec<CountryCode>>, StorageError>;

    /// Replace the list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn save_set(&self, key: &str, codes: &[CountryCode]) -> Result<(), StorageError>;

    /// Remove `key` entirely. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn clear_set(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sets: Arc<Mutex<HashMap<String, Vec<CountryCode>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_set(&self, key: &str) -> Result<Option<Vec<CountryCode>>, StorageError> {
        let guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn save_set(&self, key: &str, codes: &[CountryCode]) -> Result<(), StorageError> {
        let mut guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), codes.to_vec());
        Ok(())
    }

    async fn clear_set(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
