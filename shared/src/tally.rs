use serde::{Serialize, Deserialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{Candidate, Election};
use crate::status::ElectionStatus;

/// A candidate's position in the tally, addressed by its index in the
/// election's candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub index: usize,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub votes: u64,
}

impl Standing {
    fn of(index: usize, candidate: &Candidate) -> Self {
        Self {
            index,
            name: candidate.name.clone(),
            party: candidate.party.clone(),
            photo: candidate.photo.clone(),
            votes: candidate.vote_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResult {
    pub election_id: Uuid,
    pub status: ElectionStatus,
    pub total_votes: u64,
    pub standings: Vec<Standing>,
    pub winner: Option<Standing>,
}

/// First candidate holding the highest tally. Ties go to the earlier
/// position.
pub fn leading_candidate(candidates: &[Candidate]) -> Option<(usize, &Candidate)> {
    candidates
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &Candidate)>, (i, c)| match best {
            Some((_, b)) if b.vote_count >= c.vote_count => best,
            _ => Some((i, c)),
        })
}

/// The winner exists only once the election has ended.
pub fn winner(election: &Election, now: OffsetDateTime) -> Option<Standing> {
    if !election.status(now).is_ended() {
        return None;
    }
    leading_candidate(election.candidates()).map(|(i, c)| Standing::of(i, c))
}

/// All candidates by descending tally; equal tallies keep candidate order.
pub fn standings(candidates: &[Candidate]) -> Vec<Standing> {
    let mut sorted: Vec<_> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| Standing::of(i, c))
        .collect();
    sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
    sorted
}

pub fn result(election: &Election, now: OffsetDateTime) -> ElectionResult {
    ElectionResult {
        election_id: election.id(),
        status: election.status(now),
        total_votes: election.total_votes(),
        standings: standings(election.candidates()),
        winner: winner(election, now),
    }
}
