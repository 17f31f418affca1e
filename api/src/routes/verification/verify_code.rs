use actix_web::{web, HttpResponse};
use validator::Validate;

use dm_core::errors::DomainError;
use dm_core::services::verification::SmsServiceTrait;
use dm_shared::phone::mask_phone_number;

use crate::dto::{VerificationResponse, VerifyCodeRequest};
use crate::handlers::error_response;
use crate::state::AppState;

/// Handler for POST /api/v1/verification/verify-code
///
/// # Request Body
///
/// ```json
/// { "phone": "+14165551234", "code": "482193" }
/// ```
///
/// # Response
///
/// * `200` - `{ "ok": true }`, also for a repeat of an accepted code shortly after
/// * `400` - `{ "ok": false, "reason": "not_found" | "expired" | "mismatch" | "invalid_phone" }`
pub async fn verify_code<S>(
    state: web::Data<AppState<S>>,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse
where
    S: SmsServiceTrait + 'static,
{
    if let Err(errors) = request.validate() {
        tracing::warn!(errors = %errors, "Validation failed for verify_code request");
        // An oversized or empty code can never match
        let error = if errors.field_errors().contains_key("phone") {
            DomainError::InvalidPhone {
                phone: mask_phone_number(&request.phone),
            }
        } else {
            DomainError::Mismatch
        };
        return error_response(&error);
    }

    match state
        .verification_service
        .verify_code(&request.phone, &request.code)
    {
        Ok(verified) => {
            tracing::debug!(
                phone = %mask_phone_number(&verified.phone),
                duplicate = verified.duplicate,
                "Verification request accepted"
            );
            HttpResponse::Ok().json(VerificationResponse::ok())
        }
        Err(error) => {
            if error.is_internal() {
                tracing::error!(error = %error, "verify_code failed internally");
            }
            error_response(&error)
        }
    }
}
