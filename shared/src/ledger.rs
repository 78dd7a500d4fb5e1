use time::OffsetDateTime;

use crate::error::ElectionError;
use crate::models::Election;

impl Election {
    /// Counts one vote from `voter` for the candidate at `candidate_index`.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// the election must be active, the voter must not have voted, and the
    /// index must address a candidate. Negative indexes fail that last check
    /// like any other out-of-range value. On failure nothing is modified. On
    /// success the tally, the total, the voter set and the version all move
    /// together.
    ///
    /// This is the in-memory half of a cast. Stores apply it to a snapshot
    /// and commit the result only if the snapshot's version is still current.
    pub fn record_vote(&mut self, voter: &str, candidate_index: i64, now: OffsetDateTime) -> Result<(), ElectionError> {
        let status = self.status(now);
        if !status.is_active() {
            return Err(ElectionError::NotActive(status));
        }
        if self.voted_by.contains(voter) {
            return Err(ElectionError::AlreadyVoted);
        }
        let candidate = usize::try_from(candidate_index)
            .ok()
            .and_then(|index| self.candidates.get_mut(index))
            .ok_or(ElectionError::InvalidCandidate(candidate_index))?;

        candidate.vote_count += 1;
        self.total_votes += 1;
        self.voted_by.insert(voter.to_string());
        self.version += 1;
        Ok(())
    }
}
