use std::collections::BTreeSet;
use std::sync::Arc;

use quiz_core::model::CountryCode;
use storage::repository::{ProgressKeys, ProgressRepository, StorageError};

/// Shared read-only snapshot of a progress set.
pub type CodeSet = Arc<BTreeSet<CountryCode>>;

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub score: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub visited_count: usize,
    pub visited_percent: u8,
}

impl ProgressView {
    /// Build a view from raw counts, deriving both percentages.
    #[must_use]
    pub fn new(score: usize, total: usize, visited_count: usize) -> Self {
        Self {
            score,
            total,
            progress_percent: percent(score, total),
            visited_count,
            visited_percent: percent(visited_count, total),
        }
    }
}

/// `round(100 * part / total)`, 0 for an empty total, never above 100.
#[must_use]
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total) as u128;
    let total = total as u128;
    let rounded = (200 * part + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

/// Owns the persisted known/visited sets.
///
/// Every mutation builds a new set and swaps it in; snapshots handed out
/// earlier never change. Writes are best effort: a storage failure is logged
/// and the in-memory set stays authoritative.
#[derive(Clone)]
pub struct ProgressTracker {
    repo: Arc<dyn ProgressRepository>,
    keys: ProgressKeys,
    known: CodeSet,
    visited: CodeSet,
}

impl ProgressTracker {
    /// Load both sets. A missing visited set is seeded from the known set.
    ///
    /// A set that cannot be decoded is treated as missing; the next write
    /// replaces it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    pub async fn load(
        repo: Arc<dyn ProgressRepository>,
        keys: ProgressKeys,
    ) -> Result<Self, StorageError> {
        let known: BTreeSet<CountryCode> = load_lenient(repo.as_ref(), &keys.known)
            .await?
            .unwrap_or_default()
            .into_iter()
            .collect();
        let visited = match load_lenient(repo.as_ref(), &keys.visited).await? {
            Some(codes) => codes.into_iter().collect(),
            None => known.clone(),
        };

        tracing::debug!(
            known = known.len(),
            visited = visited.len(),
            "loaded progress"
        );

        Ok(Self {
            repo,
            keys,
            known: Arc::new(known),
            visited: Arc::new(visited),
        })
    }

    /// Tracker with empty sets that have not been read from storage.
    #[must_use]
    pub fn empty(repo: Arc<dyn ProgressRepository>, keys: ProgressKeys) -> Self {
        Self {
            repo,
            keys,
            known: Arc::default(),
            visited: Arc::default(),
        }
    }

    #[must_use]
    pub fn known(&self) -> CodeSet {
        Arc::clone(&self.known)
    }

    #[must_use]
    pub fn visited(&self) -> CodeSet {
        Arc::clone(&self.visited)
    }

    #[must_use]
    pub fn is_known(&self, code: &CountryCode) -> bool {
        self.known.contains(code)
    }

    /// Mark `code` as mastered and persist the known set.
    pub async fn register_correct(&mut self, code: &CountryCode) {
        if self.known.contains(code) {
            return;
        }
        self.known = with_code(&self.known, code);
        persist(self.repo.as_ref(), &self.keys.known, &self.known).await;
    }

    /// Mark `code` as presented and persist the visited set.
    pub async fn register_visited(&mut self, code: &CountryCode) {
        if self.visited.contains(code) {
            return;
        }
        self.visited = with_code(&self.visited, code);
        persist(self.repo.as_ref(), &self.keys.visited, &self.visited).await;
    }

    /// Start a new visited window.
    pub async fn clear_visited(&mut self) {
        self.visited = Arc::default();
        persist(self.repo.as_ref(), &self.keys.visited, &self.visited).await;
    }

    /// Forget all progress, in memory and in storage.
    pub async fn reset(&mut self) {
        self.known = Arc::default();
        self.visited = Arc::default();
        for key in [&self.keys.known, &self.keys.visited] {
            if let Err(err) = self.repo.clear_set(key).await {
                tracing::warn!(%key, %err, "failed to clear persisted progress");
            }
        }
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("keys", &self.keys)
            .field("known_len", &self.known.len())
            .field("visited_len", &self.visited.len())
            .finish_non_exhaustive()
    }
}

fn with_code(set: &BTreeSet<CountryCode>, code: &CountryCode) -> CodeSet {
    let mut next = set.clone();
    next.insert(code.clone());
    Arc::new(next)
}

async fn load_lenient(
    repo: &dyn ProgressRepository,
    key: &str,
) -> Result<Option<Vec<CountryCode>>, StorageError> {
    match repo.load_set(key).await {
        Err(StorageError::Serialization(err)) => {
            tracing::warn!(%key, %err, "discarding unreadable progress");
            Ok(None)
        }
        other => other,
    }
}

async fn persist(repo: &dyn ProgressRepository, key: &str, set: &BTreeSet<CountryCode>) {
    let codes: Vec<CountryCode> = set.iter().cloned().collect();
    if let Err(err) = repo.save_set(key, &codes).await {
        tracing::warn!(%key, %err, "failed to persist progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn code(raw: &str) -> CountryCode {
        CountryCode::new(raw).unwrap()
    }

    #[test]
    fn percent_rounds_half_up_and_handles_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(196, 196), 100);
    }

    #[test]
    fn percent_is_bounded() {
        for total in 0..40 {
            for part in 0..50 {
                assert!(percent(part, total) <= 100);
            }
        }
    }

    #[tokio::test]
    async fn visited_falls_back_to_known_on_load() {
        let repo = Arc::new(InMemoryRepository::new());
        let keys = ProgressKeys::default();
        repo.save_set(&keys.known, &[code("FRA"), code("DEU")])
            .await
            .unwrap();

        let tracker = ProgressTracker::load(repo.clone(), keys.clone())
            .await
            .unwrap();
        assert_eq!(tracker.known().len(), 2);
        assert_eq!(tracker.visited(), tracker.known());

        repo.save_set(&keys.visited, &[]).await.unwrap();
        let tracker = ProgressTracker::load(repo, keys).await.unwrap();
        assert!(tracker.visited().is_empty());
    }

    #[tokio::test]
    async fn mutations_replace_sets_and_persist() {
        let repo = Arc::new(InMemoryRepository::new());
        let keys = ProgressKeys::default();
        let mut tracker = ProgressTracker::empty(repo.clone(), keys.clone());

        let before = tracker.known();
        tracker.register_correct(&code("DEU")).await;
        assert!(before.is_empty(), "earlier snapshot must not change");
        assert!(tracker.is_known(&code("DEU")));
        assert_eq!(
            repo.load_set(&keys.known).await.unwrap(),
            Some(vec![code("DEU")])
        );

        tracker.register_visited(&code("FRA")).await;
        tracker.register_visited(&code("FRA")).await;
        assert_eq!(tracker.visited().len(), 1);

        tracker.clear_visited().await;
        assert!(tracker.visited().is_empty());
        assert_eq!(repo.load_set(&keys.visited).await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn reset_clears_memory_and_storage() {
        let repo = Arc::new(InMemoryRepository::new());
        let keys = ProgressKeys::default();
        let mut tracker = ProgressTracker::empty(repo.clone(), keys.clone());
        tracker.register_correct(&code("DEU")).await;
        tracker.register_visited(&code("DEU")).await;

        tracker.reset().await;

        assert!(tracker.known().is_empty());
        assert!(tracker.visited().is_empty());
        assert_eq!(repo.load_set(&keys.known).await.unwrap(), None);
        assert_eq!(repo.load_set(&keys.visited).await.unwrap(), None);
    }

    /// Serves `inner`, except that `corrupt` fails to decode and `down` fails to connect.
    struct FaultyRepository {
        inner: InMemoryRepository,
        corrupt: &'static str,
        down: &'static str,
    }

    #[async_trait::async_trait]
    impl ProgressRepository for FaultyRepository {
        async fn load_set(&self, key: &str) -> Result<Option<Vec<CountryCode>>, StorageError> {
            if key == self.corrupt {
                return Err(StorageError::Serialization(
                    "invalid country code: \"FRANCE\"".into(),
                ));
            }
            if key == self.down {
                return Err(StorageError::Connection("database is locked".into()));
            }
            self.inner.load_set(key).await
        }

        async fn save_set(&self, key: &str, codes: &[CountryCode]) -> Result<(), StorageError> {
            self.inner.save_set(key, codes).await
        }

        async fn clear_set(&self, key: &str) -> Result<(), StorageError> {
            self.inner.clear_set(key).await
        }
    }

    #[tokio::test]
    async fn unreadable_sets_load_as_missing() {
        let keys = ProgressKeys::default();
        let inner = InMemoryRepository::new();
        inner.save_set(&keys.visited, &[code("FRA")]).await.unwrap();
        let repo = Arc::new(FaultyRepository {
            inner,
            corrupt: "known-countries",
            down: "",
        });

        let mut tracker = ProgressTracker::load(repo.clone(), keys.clone())
            .await
            .unwrap();
        assert!(tracker.known().is_empty());
        assert_eq!(*tracker.visited(), BTreeSet::from([code("FRA")]));

        tracker.register_correct(&code("DEU")).await;
        assert_eq!(
            repo.inner.load_set(&keys.known).await.unwrap(),
            Some(vec![code("DEU")])
        );
    }

    #[tokio::test]
    async fn unreadable_known_set_still_seeds_visited() {
        let keys = ProgressKeys::default();
        let repo = Arc::new(FaultyRepository {
            inner: InMemoryRepository::new(),
            corrupt: "known-countries",
            down: "",
        });
        let tracker = ProgressTracker::load(repo, keys).await.unwrap();
        assert!(tracker.known().is_empty());
        assert!(tracker.visited().is_empty());
    }

    #[tokio::test]
    async fn connection_failures_still_surface_on_load() {
        let repo = Arc::new(FaultyRepository {
            inner: InMemoryRepository::new(),
            corrupt: "",
            down: "visited-countries",
        });
        let err = ProgressTracker::load(repo, ProgressKeys::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }
}
