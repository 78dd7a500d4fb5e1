use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ElectionError, ErrorCode, ErrorResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Election(#[from] ElectionError),
    #[error("Invalid election ID")]
    InvalidId,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidId => Status::BadRequest,
            ApiError::Election(e) => match e {
                ElectionError::NotFound(_) => Status::NotFound,
                ElectionError::InvalidSchedule
                | ElectionError::InvalidTitle(_)
                | ElectionError::NoCandidates
                | ElectionError::InvalidCandidates(_)
                | ElectionError::InvalidCandidate(_) => Status::BadRequest,
                ElectionError::NotActive(_) => Status::Forbidden,
                ElectionError::AlreadyVoted => Status::Conflict,
                ElectionError::StoreUnavailable(_) => Status::ServiceUnavailable,
            },
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidId => ErrorCode::InvalidInput,
            ApiError::Election(e) => e.code(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };

        rocket::Response::build_from(Json(body).respond_to(req)?)
            .status(status)
            .ok()
    }
}
