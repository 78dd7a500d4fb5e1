use time::OffsetDateTime;
use crate::models::{CandidateInput, CreateElectionRequest};

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_CANDIDATES: usize = 50;
pub const MAX_CANDIDATE_NAME_LENGTH: usize = 80;
pub const MAX_PARTY_LENGTH: usize = 80;
pub const MAX_PHOTO_BYTES: usize = 512 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("End date/time must be after start date/time")]
    InvalidSchedule,
    #[error("Election title must not be empty")]
    EmptyTitle,
    #[error("Title exceeds maximum length of {MAX_TITLE_LENGTH}")]
    TitleTooLong,
    #[error("Add at least one candidate with a name")]
    NoCandidates,
    #[error("Too many candidates (maximum {MAX_CANDIDATES})")]
    TooManyCandidates,
    #[error("Candidate name exceeds maximum length of {MAX_CANDIDATE_NAME_LENGTH}: {0}")]
    CandidateNameTooLong(String),
    #[error("Party name exceeds maximum length of {MAX_PARTY_LENGTH}: {0}")]
    PartyTooLong(String),
    #[error("Photo for candidate {0} exceeds {MAX_PHOTO_BYTES} bytes")]
    PhotoTooLarge(String),
}

/// A creation request that passed validation, with names trimmed and blank
/// candidates removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionDraft {
    pub title: String,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
    pub candidates: Vec<CandidateDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDraft {
    pub name: String,
    pub party: Option<String>,
    pub photo: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_candidate(input: &CandidateInput) -> Option<CandidateDraft> {
    let name = input.name.trim();
    if name.is_empty() {
        return None;
    }
    Some(CandidateDraft {
        name: name.to_string(),
        party: non_blank(input.party.as_ref()),
        photo: non_blank(input.photo.as_ref()),
    })
}

pub fn validate_election_request(request: &CreateElectionRequest) -> Result<ElectionDraft, ValidationError> {
    if request.ends_at <= request.starts_at { return Err(ValidationError::InvalidSchedule); }

    let title = request.title.trim();
    if title.is_empty() { return Err(ValidationError::EmptyTitle); }
    if title.chars().count() > MAX_TITLE_LENGTH { return Err(ValidationError::TitleTooLong); }

    let candidates: Vec<_> = request.candidates.iter().filter_map(normalize_candidate).collect();
    if candidates.is_empty() { return Err(ValidationError::NoCandidates); }
    if candidates.len() > MAX_CANDIDATES { return Err(ValidationError::TooManyCandidates); }

    if let Some(c) = candidates.iter().find(|c| c.name.chars().count() > MAX_CANDIDATE_NAME_LENGTH) {
        return Err(ValidationError::CandidateNameTooLong(c.name.clone()));
    }
    if let Some(party) = candidates.iter().filter_map(|c| c.party.as_ref()).find(|p| p.chars().count() > MAX_PARTY_LENGTH) {
        return Err(ValidationError::PartyTooLong(party.clone()));
    }
    if let Some(c) = candidates.iter().find(|c| c.photo.as_ref().map_or(false, |p| p.len() > MAX_PHOTO_BYTES)) {
        return Err(ValidationError::PhotoTooLarge(c.name.clone()));
    }

    Ok(ElectionDraft {
        title: title.to_string(),
        starts_at: request.starts_at,
        ends_at: request.ends_at,
        candidates,
    })
}
