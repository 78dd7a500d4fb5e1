use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;
use shared::{models::Election, ElectionStatus};

use crate::processor::ElectionProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub election_id: Uuid,
    pub from: ElectionStatus,
    pub to: ElectionStatus,
}

/// Remembers the last phase seen for each election so the ticker can tell
/// when a schedule boundary has been crossed. Holds no authority over the
/// records themselves.
#[derive(Debug, Default)]
pub struct PhaseWatch {
    last_seen: HashMap<Uuid, ElectionStatus>,
}

impl PhaseWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elections seen for the first time are recorded without being
    /// reported; elections that disappeared are forgotten.
    pub fn observe(&mut self, elections: &[Election], now: OffsetDateTime) -> Vec<PhaseChange> {
        let mut changes = Vec::new();
        let mut current = HashMap::with_capacity(elections.len());

        for election in elections {
            let status = election.status(now);
            if let Some(&previous) = self.last_seen.get(&election.id()) {
                if previous != status {
                    changes.push(PhaseChange { election_id: election.id(), from: previous, to: status });
                }
            }
            current.insert(election.id(), status);
        }

        self.last_seen = current;
        changes
    }
}

/// Re-evaluates every election's phase on a fixed period and broadcasts a
/// change notification whenever one opens or closes. Never writes to the
/// store.
pub async fn run_status_ticker(processor: Arc<ElectionProcessor>, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut watch = PhaseWatch::new();
    info!("⏱️ Status ticker started, every {:?}", every);

    loop {
        interval.tick().await;
        let elections = match processor.list_elections().await {
            Ok(elections) => elections,
            Err(e) => {
                error!("Status tick failed: {}", e);
                continue;
            }
        };

        let changes = watch.observe(&elections, processor.now());
        if changes.is_empty() {
            continue;
        }
        for change in &changes {
            info!("Election {} moved {} → {}", change.election_id, change.from, change.to);
        }
        processor.notifier().elections_changed();
    }
}
