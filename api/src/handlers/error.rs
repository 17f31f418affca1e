//! Mapping from domain outcomes to HTTP responses

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};

use dm_core::errors::DomainError;

use crate::dto::VerificationResponse;

/// Reason reported for bodies that cannot be parsed at all
pub const INVALID_REQUEST: &str = "invalid_request";

/// Reason reported for paths no route serves
pub const UNKNOWN_ROUTE: &str = "unknown_route";

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::InvalidPhone { .. } => StatusCode::BAD_REQUEST,
        DomainError::SendFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::NotFound | DomainError::Expired | DomainError::Mismatch => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a domain error as `{ "ok": false, "reason": ... }`
///
/// Internal details never reach the client; only the stable reason code does.
pub fn error_response(error: &DomainError) -> HttpResponse {
    HttpResponse::build(status_for(error)).json(VerificationResponse::rejected(error.reason()))
}

/// `JsonConfig` error handler keeping malformed bodies in the same envelope
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(path = %req.path(), error = %err, "Rejected malformed JSON body");

    let response =
        HttpResponse::BadRequest().json(VerificationResponse::rejected(INVALID_REQUEST));
    actix_web::error::InternalError::from_response(err, response).into()
}
