use actix_web::{web, HttpResponse};

use dm_core::services::verification::SmsServiceTrait;

use crate::state::AppState;

/// Health check endpoint handler
pub async fn health_check<S>(state: web::Data<AppState<S>>) -> HttpResponse
where
    S: SmsServiceTrait + 'static,
{
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "dealmarket-verification",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "active_records": state.verification_service.store().len(),
    }))
}
