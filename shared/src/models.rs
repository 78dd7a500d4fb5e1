use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::status::{Countdown, ElectionStatus};
use crate::tally::{self, Standing};
use crate::validation::{CandidateDraft, ElectionDraft};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub vote_count: u64,
}

impl From<CandidateDraft> for Candidate {
    fn from(draft: CandidateDraft) -> Self {
        Self {
            name: draft.name,
            party: draft.party,
            photo: draft.photo,
            vote_count: 0,
        }
    }
}

/// A scheduled election. Only `record_vote` mutates it after creation, so the
/// tally and voter invariants hold for every value of this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "ElectionRecord")]
pub struct Election {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) ends_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) total_votes: u64,
    pub(crate) voted_by: BTreeSet<String>,
    pub(crate) version: u64,
}

impl Election {
    pub fn new(id: Uuid, draft: ElectionDraft, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            title: draft.title,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            created_at,
            candidates: draft.candidates.into_iter().map(Candidate::from).collect(),
            total_votes: 0,
            voted_by: BTreeSet::new(),
            version: 0,
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn starts_at(&self) -> OffsetDateTime { self.starts_at }
    pub fn ends_at(&self) -> OffsetDateTime { self.ends_at }
    pub fn created_at(&self) -> OffsetDateTime { self.created_at }
    pub fn candidates(&self) -> &[Candidate] { &self.candidates }
    pub fn total_votes(&self) -> u64 { self.total_votes }
    pub fn voted_by(&self) -> &BTreeSet<String> { &self.voted_by }
    pub fn version(&self) -> u64 { self.version }

    pub fn status(&self, now: OffsetDateTime) -> ElectionStatus {
        ElectionStatus::evaluate(self.starts_at, self.ends_at, now)
    }

    /// Time until the election opens while upcoming, or until it closes while
    /// active.
    pub fn countdown(&self, now: OffsetDateTime) -> Option<Countdown> {
        match self.status(now) {
            ElectionStatus::Upcoming => Countdown::until(self.starts_at, now),
            ElectionStatus::Active => Countdown::until(self.ends_at, now),
            ElectionStatus::Ended => None,
        }
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.voted_by.contains(voter)
    }

    pub fn voter_count(&self) -> usize {
        self.voted_by.len()
    }

    pub fn to_record(&self) -> ElectionRecord {
        ElectionRecord {
            id: self.id,
            title: self.title.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            created_at: self.created_at,
            candidates: self.candidates.clone(),
            total_votes: self.total_votes,
            voted_by: self.voted_by.iter().cloned().collect(),
            version: self.version,
        }
    }
}

/// Persisted shape of an election, as written by the stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElectionRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub candidates: Vec<Candidate>,
    pub total_votes: u64,
    pub voted_by: Vec<String>,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record {0}: end time is not after start time")]
    InvalidSchedule(Uuid),
    #[error("record {0}: no candidates")]
    NoCandidates(Uuid),
    #[error("record {id}: total votes {total} does not match tally sum {sum}")]
    TallyMismatch { id: Uuid, total: u64, sum: u64 },
    #[error("record {id}: {voters} voters recorded for {total} votes")]
    VoterCountMismatch { id: Uuid, voters: usize, total: u64 },
    #[error("record {id}: voter {voter} listed twice")]
    DuplicateVoter { id: Uuid, voter: String },
}

impl TryFrom<ElectionRecord> for Election {
    type Error = RecordError;

    fn try_from(record: ElectionRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        if record.ends_at <= record.starts_at {
            return Err(RecordError::InvalidSchedule(id));
        }
        if record.candidates.is_empty() {
            return Err(RecordError::NoCandidates(id));
        }
        let sum: u64 = record.candidates.iter().map(|c| c.vote_count).sum();
        if sum != record.total_votes {
            return Err(RecordError::TallyMismatch { id, total: record.total_votes, sum });
        }

        let mut voted_by = BTreeSet::new();
        for voter in record.voted_by {
            if !voted_by.insert(voter.clone()) {
                return Err(RecordError::DuplicateVoter { id, voter });
            }
        }
        if voted_by.len() as u64 != record.total_votes {
            return Err(RecordError::VoterCountMismatch { id, voters: voted_by.len(), total: record.total_votes });
        }

        Ok(Self {
            id,
            title: record.title,
            starts_at: record.starts_at,
            ends_at: record.ends_at,
            created_at: record.created_at,
            candidates: record.candidates,
            total_votes: record.total_votes,
            voted_by,
            version: record.version,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInput {
    pub name: String,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectionRequest {
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    pub candidates: Vec<CandidateInput>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    /// Signed on the wire so a negative index reaches the engine and is
    /// reported in check order.
    pub candidate_index: i64,
}

/// What readers see of an election at a given instant. Derived fields are
/// recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElectionView {
    pub id: Uuid,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    pub status: ElectionStatus,
    pub countdown: Option<Countdown>,
    pub candidates: Vec<Candidate>,
    pub total_votes: u64,
    pub voter_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
    pub winner: Option<Standing>,
}

impl ElectionView {
    pub fn at(election: &Election, now: OffsetDateTime, viewer: Option<&str>) -> Self {
        Self {
            id: election.id,
            title: election.title.clone(),
            starts_at: election.starts_at,
            ends_at: election.ends_at,
            status: election.status(now),
            countdown: election.countdown(now),
            candidates: election.candidates.clone(),
            total_votes: election.total_votes,
            voter_count: election.voter_count(),
            has_voted: viewer.map(|voter| election.has_voted(voter)),
            winner: tally::winner(election, now),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummary {
    pub total: usize,
    pub upcoming: usize,
    pub active: usize,
    pub ended: usize,
}

impl ElectionSummary {
    pub fn of<'a>(elections: impl IntoIterator<Item = &'a Election>, now: OffsetDateTime) -> Self {
        elections.into_iter().fold(Self::default(), |mut summary, election| {
            summary.total += 1;
            match election.status(now) {
                ElectionStatus::Upcoming => summary.upcoming += 1,
                ElectionStatus::Active => summary.active += 1,
                ElectionStatus::Ended => summary.ended += 1,
            }
            summary
        })
    }
}
