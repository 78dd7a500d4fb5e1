use serde::{Serialize, Deserialize};
use thiserror::Error;
use uuid::Uuid;

use crate::status::ElectionStatus;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Resource not found")]
    NotFound,
    #[error("Invalid schedule")]
    InvalidSchedule,
    #[error("Invalid title")]
    InvalidTitle,
    #[error("No candidates")]
    NoCandidates,
    #[error("Invalid candidates")]
    InvalidCandidates,
    #[error("Election not active")]
    NotActive,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Invalid candidate")]
    InvalidCandidate,
    #[error("Store unavailable")]
    StoreUnavailable,
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Operation not authorized")]
    Unauthorized,
    #[error("Operation forbidden")]
    Forbidden,
    #[error("Internal system error")]
    SystemError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

/// Everything the engine can refuse. None of these are fatal; callers report
/// them and may retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ElectionError {
    #[error("Election {0} not found")]
    NotFound(Uuid),
    #[error("End time must be after start time")]
    InvalidSchedule,
    #[error("Invalid title: {0}")]
    InvalidTitle(String),
    #[error("Add at least one candidate with a name")]
    NoCandidates,
    #[error("Invalid candidates: {0}")]
    InvalidCandidates(String),
    #[error("Election is not active ({0})")]
    NotActive(ElectionStatus),
    #[error("Already voted in this election")]
    AlreadyVoted,
    #[error("Candidate index {0} is out of range")]
    InvalidCandidate(i64),
    #[error("Election store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ElectionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidSchedule => ErrorCode::InvalidSchedule,
            Self::InvalidTitle(_) => ErrorCode::InvalidTitle,
            Self::NoCandidates => ErrorCode::NoCandidates,
            Self::InvalidCandidates(_) => ErrorCode::InvalidCandidates,
            Self::NotActive(_) => ErrorCode::NotActive,
            Self::AlreadyVoted => ErrorCode::AlreadyVoted,
            Self::InvalidCandidate(_) => ErrorCode::InvalidCandidate,
            Self::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
        }
    }

    pub fn response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        }
    }
}

impl From<ValidationError> for ElectionError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidSchedule => Self::InvalidSchedule,
            ValidationError::EmptyTitle | ValidationError::TitleTooLong => Self::InvalidTitle(e.to_string()),
            ValidationError::NoCandidates => Self::NoCandidates,
            ValidationError::TooManyCandidates
            | ValidationError::CandidateNameTooLong(_)
            | ValidationError::PartyTooLong(_)
            | ValidationError::PhotoTooLarge(_) => Self::InvalidCandidates(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ElectionError>;
