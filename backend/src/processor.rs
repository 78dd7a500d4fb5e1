use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use shared::{
    models::*,
    tally::{self, ElectionResult, Standing},
    validation::validate_election_request,
    Clock, ElectionError, ElectionStatus, Result,
};

use crate::config::Config;
use crate::notifier::ChangeNotifier;
use crate::store::{ElectionStore, StoreError, SwapOutcome};

/// Entry point for every election operation. Reads always go to the store
/// and derive status and winner from what they find there; writes commit
/// first and notify after.
pub struct ElectionProcessor {
    store: Arc<dyn ElectionStore>,
    clock: Arc<dyn Clock>,
    notifier: ChangeNotifier,
    store_timeout: Duration,
    max_cast_attempts: u32,
}

impl ElectionProcessor {
    pub fn new(store: Arc<dyn ElectionStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            store,
            clock,
            notifier: ChangeNotifier::new(config.notify_capacity),
            store_timeout: config.store_timeout,
            max_cast_attempts: config.max_cast_attempts,
        }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    async fn bounded<T>(&self, op: &'static str, call: impl Future<Output = std::result::Result<T, StoreError>>) -> Result<T> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Store {} failed: {}", op, e);
                Err(e.into())
            }
            Err(_) => {
                error!("Store {} timed out after {:?}", op, self.store_timeout);
                Err(ElectionError::StoreUnavailable(format!("{op} timed out after {:?}", self.store_timeout)))
            }
        }
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_election(&self, request: &CreateElectionRequest) -> Result<Election> {
        let draft = validate_election_request(request).map_err(|e| {
            debug!("Rejected election: {}", e);
            ElectionError::from(e)
        })?;

        let election = Election::new(Uuid::new_v4(), draft, self.now());
        self.bounded("insert", self.store.insert(&election)).await?;

        info!("🗳️ Created election {} with {} candidates", election.id(), election.candidates().len());
        self.notifier.elections_changed();
        Ok(election)
    }

    /// Deleting an absent election is not an error. Returns whether a record
    /// was removed.
    #[instrument(skip(self))]
    pub async fn delete_election(&self, id: Uuid) -> Result<bool> {
        let removed = self.bounded("remove", self.store.remove(id)).await?;
        if removed {
            info!("🗑️ Deleted election {}", id);
            self.notifier.elections_changed();
        } else {
            debug!("Election {} already absent", id);
        }
        Ok(removed)
    }

    pub async fn get_election(&self, id: Uuid) -> Result<Election> {
        self.bounded("fetch", self.store.fetch(id))
            .await?
            .ok_or(ElectionError::NotFound(id))
    }

    pub async fn list_elections(&self) -> Result<Vec<Election>> {
        self.bounded("fetch_all", self.store.fetch_all()).await
    }

    /// Records one vote. The read-check-write runs against a snapshot and
    /// commits only if nobody else committed in between; on conflict every
    /// check is re-run against the fresh record, so a racing duplicate ends
    /// in `AlreadyVoted`.
    ///
    /// A timeout on the commit itself leaves the outcome unknown: the write
    /// may have landed after the deadline. The caller gets `StoreUnavailable`
    /// either way, and retrying is safe because a landed vote then reports
    /// `AlreadyVoted`.
    #[instrument(skip(self, voter), fields(election_id = %id))]
    pub async fn cast_vote(&self, id: Uuid, voter: &str, candidate_index: i64) -> Result<Election> {
        for attempt in 1..=self.max_cast_attempts {
            let current = self.get_election(id).await?;
            let mut next = current.clone();
            if let Err(e) = next.record_vote(voter, candidate_index, self.now()) {
                debug!("Vote rejected: {}", e);
                return Err(e);
            }

            match self.bounded("compare_and_swap", self.store.compare_and_swap(&next, current.version())).await? {
                SwapOutcome::Swapped => {
                    info!("✓ Vote recorded, {} total", next.total_votes());
                    self.notifier.elections_changed();
                    return Ok(next);
                }
                SwapOutcome::Conflict => debug!("Version conflict on attempt {}, retrying", attempt),
                SwapOutcome::Missing => return Err(ElectionError::NotFound(id)),
            }
        }

        warn!("Gave up after {} conflicting attempts", self.max_cast_attempts);
        Err(ElectionError::StoreUnavailable(format!(
            "election {id} is too contended, gave up after {} attempts",
            self.max_cast_attempts
        )))
    }

    pub async fn winner(&self, id: Uuid) -> Result<Option<Standing>> {
        let election = self.get_election(id).await?;
        Ok(tally::winner(&election, self.now()))
    }

    pub async fn result(&self, id: Uuid) -> Result<ElectionResult> {
        let election = self.get_election(id).await?;
        Ok(tally::result(&election, self.now()))
    }

    pub async fn view(&self, id: Uuid, viewer: Option<&str>) -> Result<ElectionView> {
        let election = self.get_election(id).await?;
        Ok(ElectionView::at(&election, self.now(), viewer))
    }

    /// Active first, then upcoming, then ended. Open elections closing
    /// soonest lead; ended ones are most recent first.
    pub async fn views(&self, viewer: Option<&str>) -> Result<Vec<ElectionView>> {
        let now = self.now();
        let mut views: Vec<_> = self
            .list_elections()
            .await?
            .iter()
            .map(|e| ElectionView::at(e, now, viewer))
            .collect();
        views.sort_by(|a, b| compare_views(a, b));
        Ok(views)
    }

    pub async fn summary(&self) -> Result<ElectionSummary> {
        let elections = self.list_elections().await?;
        Ok(ElectionSummary::of(&elections, self.now()))
    }
}

fn phase_rank(status: ElectionStatus) -> u8 {
    match status {
        ElectionStatus::Active => 0,
        ElectionStatus::Upcoming => 1,
        ElectionStatus::Ended => 2,
    }
}

fn compare_views(a: &ElectionView, b: &ElectionView) -> Ordering {
    phase_rank(a.status)
        .cmp(&phase_rank(b.status))
        .then_with(|| match a.status {
            ElectionStatus::Ended => b.ends_at.cmp(&a.ends_at),
            _ => a.ends_at.cmp(&b.ends_at),
        })
        .then_with(|| a.id.cmp(&b.id))
}
