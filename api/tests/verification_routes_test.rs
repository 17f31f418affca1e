use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dm_api::dto::VerificationResponse;
use dm_api::{create_app, AppState};
use dm_core::services::verification::{
    CodeGenerator, ManualClock, SmsServiceTrait, VerificationService, VerificationServiceConfig,
};

const PHONE: &str = "+14165551234";

/// SMS sender recording bodies, with a switchable outage
#[derive(Default)]
struct RecordingSms {
    sent: Mutex<Vec<(String, String)>>,
    down: AtomicBool,
}

#[async_trait]
impl SmsServiceTrait for RecordingSms {
    async fn send_sms(&self, phone: &str, body: &str) -> Result<String, String> {
        if self.down.load(Ordering::SeqCst) {
            return Err("provider unavailable".to_string());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((phone.to_string(), body.to_string()));
        Ok(format!("test-msg-{}", sent.len()))
    }
}

struct FixedCode(&'static str);

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

struct Harness {
    state: web::Data<AppState<RecordingSms>>,
    sms: Arc<RecordingSms>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let sms = Arc::new(RecordingSms::default());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));
    let service = VerificationService::with_components(
        sms.clone(),
        VerificationServiceConfig::default(),
        Arc::new(FixedCode("482193")),
        clock.clone(),
    );

    Harness {
        state: web::Data::new(AppState::new(Arc::new(service))),
        sms,
        clock,
    }
}

fn send_code_request(phone: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/verification/send-code")
        .set_json(serde_json::json!({ "phone": phone }))
}

fn verify_code_request(phone: &str, code: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/verification/verify-code")
        .set_json(serde_json::json!({ "phone": phone, "code": code }))
}

#[actix_web::test]
async fn test_send_code_success() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let resp = test::call_service(&app, send_code_request("(416) 555-1234").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::ok());

    let sent = h.sms.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, PHONE);
    assert!(sent[0].1.contains("482193"));
}

#[actix_web::test]
async fn test_send_code_invalid_phone() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    for phone in ["", "not a phone", "12", "€€€"] {
        let resp = test::call_service(&app, send_code_request(phone).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: VerificationResponse = test::read_body_json(resp).await;
        assert_eq!(body, VerificationResponse::rejected("invalid_phone"));
    }
    assert!(h.sms.sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_send_code_provider_failure() {
    let h = harness();
    h.sms.down.store(true, Ordering::SeqCst);
    let app = test::init_service(create_app(h.state.clone())).await;

    let resp = test::call_service(&app, send_code_request(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("send_failed"));
    assert!(h.state.verification_service.store().is_empty());
}

#[actix_web::test]
async fn test_verify_code_flow() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let resp = test::call_service(&app, send_code_request(PHONE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, verify_code_request(PHONE, "000000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("mismatch"));

    let resp = test::call_service(&app, verify_code_request(PHONE, "482193").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Client retry inside the grace window
    h.clock.advance(Duration::seconds(5));
    let resp = test::call_service(&app, verify_code_request(PHONE, "482193").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    h.clock.advance(Duration::seconds(60));
    let resp = test::call_service(&app, verify_code_request(PHONE, "482193").to_request()).await;
    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("expired"));

    let resp = test::call_service(&app, verify_code_request(PHONE, "482193").to_request()).await;
    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("not_found"));
}

#[actix_web::test]
async fn test_verify_code_expired() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    test::call_service(&app, send_code_request(PHONE).to_request()).await;
    h.clock.advance(Duration::minutes(11));

    let resp = test::call_service(&app, verify_code_request(PHONE, "482193").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("expired"));
}

#[actix_web::test]
async fn test_verify_code_validation() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    for phone in ["", "€€€"] {
        let resp = test::call_service(&app, verify_code_request(phone, "482193").to_request()).await;
        let body: VerificationResponse = test::read_body_json(resp).await;
        assert_eq!(body, VerificationResponse::rejected("invalid_phone"));
    }

    let resp = test::call_service(&app, verify_code_request(PHONE, "").to_request()).await;
    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("mismatch"));

    let resp = test::call_service(&app, verify_code_request(PHONE, "482193").to_request()).await;
    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("not_found"));
}

#[actix_web::test]
async fn test_malformed_json_body() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/verification/send-code")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"phone\":")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("invalid_request"));
}

#[actix_web::test]
async fn test_health_reports_active_records() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    test::call_service(&app, send_code_request(PHONE).to_request()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_records"], 1);
}

#[actix_web::test]
async fn test_unknown_route() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: VerificationResponse = test::read_body_json(resp).await;
    assert_eq!(body, VerificationResponse::rejected("unknown_route"));
}
