use std::collections::HashMap;
use std::sync::Mutex;
use rocket::async_trait;
use shared::models::{Election, RecordError};
use shared::ElectionError;
use uuid::Uuid;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    LockFailed,
    #[error("election {0} already exists")]
    DuplicateId(Uuid),
    #[error("corrupt record: {0}")]
    Corrupt(#[from] RecordError),
    #[error("{0}")]
    Unavailable(String),
}

impl From<StoreError> for ElectionError {
    fn from(e: StoreError) -> Self {
        ElectionError::StoreUnavailable(e.to_string())
    }
}

/// Outcome of a conditional replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped,
    /// The stored version moved on since the snapshot was read.
    Conflict,
    Missing,
}

/// Durable home of election records. The store is the only shared mutable
/// state; every write to an existing record goes through `compare_and_swap`.
#[async_trait]
pub trait ElectionStore: Send + Sync {
    async fn insert(&self, election: &Election) -> Result<(), StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<Election>, StoreError>;

    /// Newest first.
    async fn fetch_all(&self) -> Result<Vec<Election>, StoreError>;

    /// Returns whether a record was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Replaces the stored record with `election` only if the stored version
    /// still equals `expected_version`.
    async fn compare_and_swap(&self, election: &Election, expected_version: u64) -> Result<SwapOutcome, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    elections: Mutex<HashMap<Uuid, Election>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Election>>, StoreError> {
        self.elections.lock().map_err(|_| StoreError::LockFailed)
    }
}

#[async_trait]
impl ElectionStore for MemoryStore {
    async fn insert(&self, election: &Election) -> Result<(), StoreError> {
        let mut elections = self.lock()?;
        if elections.contains_key(&election.id()) {
            return Err(StoreError::DuplicateId(election.id()));
        }
        elections.insert(election.id(), election.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Election>, StoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn fetch_all(&self) -> Result<Vec<Election>, StoreError> {
        let mut all: Vec<_> = self.lock()?.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| a.id().cmp(&b.id())));
        Ok(all)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    async fn compare_and_swap(&self, election: &Election, expected_version: u64) -> Result<SwapOutcome, StoreError> {
        let mut elections = self.lock()?;
        match elections.get_mut(&election.id()) {
            None => Ok(SwapOutcome::Missing),
            Some(stored) if stored.version() != expected_version => Ok(SwapOutcome::Conflict),
            Some(stored) => {
                *stored = election.clone();
                Ok(SwapOutcome::Swapped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{validate_election_request, CandidateInput, CreateElectionRequest};
    use time::{Duration, OffsetDateTime};

    fn sample(created_offset: i64) -> Election {
        let start = OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap();
        let draft = validate_election_request(&CreateElectionRequest {
            title: "Sample".into(),
            starts_at: start,
            ends_at: start + Duration::hours(1),
            candidates: vec![CandidateInput { name: "A".into(), party: None, photo: None }],
        })
        .unwrap();
        Election::new(Uuid::new_v4(), draft, start + Duration::seconds(created_offset))
    }

    #[rocket::async_test]
    async fn cas_rejects_stale_versions() {
        let store = MemoryStore::new();
        let original = sample(0);
        store.insert(&original).await.unwrap();

        let mut first = original.clone();
        first.record_vote("v1", 0, original.starts_at()).unwrap();
        let mut second = original.clone();
        second.record_vote("v2", 0, original.starts_at()).unwrap();

        assert_eq!(store.compare_and_swap(&first, 0).await.unwrap(), SwapOutcome::Swapped);
        assert_eq!(store.compare_and_swap(&second, 0).await.unwrap(), SwapOutcome::Conflict);
        assert_eq!(store.fetch(original.id()).await.unwrap(), Some(first));

        store.remove(original.id()).await.unwrap();
        assert_eq!(store.compare_and_swap(&second, 1).await.unwrap(), SwapOutcome::Missing);
    }

    #[rocket::async_test]
    async fn duplicate_insert_and_listing_order() {
        let store = MemoryStore::new();
        let (old, new) = (sample(0), sample(10));
        store.insert(&old).await.unwrap();
        store.insert(&new).await.unwrap();
        assert!(matches!(store.insert(&old).await, Err(StoreError::DuplicateId(_))));

        let ids: Vec<_> = store.fetch_all().await.unwrap().iter().map(Election::id).collect();
        assert_eq!(ids, vec![new.id(), old.id()]);

        assert!(store.remove(old.id()).await.unwrap());
        assert!(!store.remove(old.id()).await.unwrap());
    }
}
