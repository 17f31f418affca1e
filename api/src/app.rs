//! Application factory
//!
//! Builds the Actix-web application around shared verification state.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use dm_core::services::verification::SmsServiceTrait;

use crate::dto::VerificationResponse;
use crate::handlers::{json_error_handler, UNKNOWN_ROUTE};
use crate::routes::health::health_check;
use crate::routes::verification::{send_code, verify_code};
use crate::state::AppState;

/// Create and configure the application with all dependencies
pub fn create_app<S>(
    app_state: web::Data<AppState<S>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: SmsServiceTrait + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(
            web::JsonConfig::default()
                .limit(4096)
                .error_handler(json_error_handler),
        )
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check::<S>))
        .service(
            web::scope("/api/v1").service(
                web::scope("/verification")
                    .route("/send-code", web::post().to(send_code::<S>))
                    .route("/verify-code", web::post().to(verify_code::<S>)),
            ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(VerificationResponse::rejected(UNKNOWN_ROUTE))
}
