use actix_web::{web, HttpResponse};
use validator::Validate;

use dm_core::errors::DomainError;
use dm_core::services::verification::SmsServiceTrait;
use dm_shared::phone::mask_phone_number;

use crate::dto::{SendCodeRequest, VerificationResponse};
use crate::handlers::error_response;
use crate::state::AppState;

/// Handler for POST /api/v1/verification/send-code
///
/// Issues a fresh code for the phone and sends it by SMS. Any earlier code for
/// the same phone stops working.
///
/// # Request Body
///
/// ```json
/// { "phone": "+14165551234" }
/// ```
///
/// # Response
///
/// * `200` - `{ "ok": true }`
/// * `400` - `{ "ok": false, "reason": "invalid_phone" }`
/// * `503` - `{ "ok": false, "reason": "send_failed" }`
pub async fn send_code<S>(
    state: web::Data<AppState<S>>,
    request: web::Json<SendCodeRequest>,
) -> HttpResponse
where
    S: SmsServiceTrait + 'static,
{
    if let Err(errors) = request.validate() {
        tracing::warn!(errors = %errors, "Validation failed for send_code request");
        return error_response(&DomainError::InvalidPhone {
            phone: mask_phone_number(&request.phone),
        });
    }

    match state.verification_service.request_code(&request.phone).await {
        Ok(sent) => {
            tracing::info!(
                phone = %mask_phone_number(&sent.phone),
                message_id = %sent.message_id,
                "Verification code sent"
            );
            HttpResponse::Ok().json(VerificationResponse::ok())
        }
        Err(error) => {
            if error.is_internal() {
                tracing::error!(error = %error, "send_code failed internally");
            }
            error_response(&error)
        }
    }
}
