use rocket::{Request, catch, serde::json::Json};
use shared::{ErrorCode, ErrorResponse};

fn message(error: &str, code: ErrorCode) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.into(),
        code,
    })
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorResponse> {
    message("Sign in to continue.", ErrorCode::Unauthorized)
}

#[catch(403)]
pub fn forbidden(_req: &Request) -> Json<ErrorResponse> {
    message("Administrator role required.", ErrorCode::Forbidden)
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    message("Invalid request parameters.", ErrorCode::InvalidInput)
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<ErrorResponse> {
    message("Malformed request body.", ErrorCode::InvalidInput)
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    message("An internal server error occurred.", ErrorCode::SystemError)
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorResponse> {
    message("The requested resource was not found.", ErrorCode::NotFound)
}
