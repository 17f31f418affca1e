//! Integration tests for the phone verification lifecycle

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dm_core::services::verification::{
    Clock, ManualClock, SmsServiceTrait, VerificationService, VerificationServiceConfig,
};
use dm_core::DomainError;

// Records the latest body per phone so tests can read codes back
#[derive(Default)]
struct InboxSmsService {
    inbox: Mutex<HashMap<String, String>>,
}

impl InboxSmsService {
    fn code_for(&self, phone: &str) -> Option<String> {
        let inbox = self.inbox.lock().unwrap();
        let body = inbox.get(phone)?;
        body.split("code is: ")
            .nth(1)
            .map(|rest| rest.chars().take(6).collect())
    }
}

#[async_trait]
impl SmsServiceTrait for InboxSmsService {
    async fn send_sms(&self, phone: &str, body: &str) -> Result<String, String> {
        self.inbox
            .lock()
            .unwrap()
            .insert(phone.to_string(), body.to_string());
        Ok(format!("inbox-{}", phone))
    }
}

fn service_with_clock() -> (
    VerificationService<InboxSmsService>,
    Arc<InboxSmsService>,
    Arc<ManualClock>,
) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));
    let sms = Arc::new(InboxSmsService::default());
    let service = VerificationService::with_components(
        sms.clone(),
        VerificationServiceConfig::default(),
        Arc::new(dm_core::services::verification::RandomCodeGenerator),
        clock.clone(),
    );
    (service, sms, clock)
}

#[tokio::test]
async fn test_request_and_verify_round_trip() {
    let (service, sms, _clock) = service_with_clock();

    let sent = service.request_code("416-555-1234").await.unwrap();
    assert_eq!(sent.phone, "+14165551234");

    let code = sms.code_for(&sent.phone).unwrap();
    let verified = service.verify_code(&sent.phone, &code).unwrap();
    assert!(!verified.duplicate);
}

#[tokio::test]
async fn test_codes_are_six_digits_in_range() {
    let (service, sms, _clock) = service_with_clock();

    for i in 0..50 {
        let phone = format!("+1416555{:04}", i);
        service.request_code(&phone).await.unwrap();
        let code = sms.code_for(&phone).unwrap();
        let value: u32 = code.parse().unwrap();
        assert_eq!(code.len(), 6);
        assert!((100_000..=999_999).contains(&value));
    }
}

#[tokio::test]
async fn test_only_latest_code_is_valid() {
    let (service, sms, _clock) = service_with_clock();
    let phone = "+14165551234";

    service.request_code(phone).await.unwrap();
    let first = sms.code_for(phone).unwrap();
    service.request_code(phone).await.unwrap();
    let second = sms.code_for(phone).unwrap();

    if first != second {
        assert_eq!(
            service.verify_code(phone, &first).unwrap_err(),
            DomainError::Mismatch
        );
    }
    assert!(service.verify_code(phone, &second).is_ok());
}

#[tokio::test]
async fn test_expiry_grace_and_sweep() {
    let (service, sms, clock) = service_with_clock();
    let used = "+14165551234";
    let idle = "+14165559876";

    service.request_code(used).await.unwrap();
    service.request_code(idle).await.unwrap();
    let code = sms.code_for(used).unwrap();

    clock.advance(Duration::minutes(9) + Duration::seconds(50));
    assert!(!service.verify_code(used, &code).unwrap().duplicate);
    assert!(service.verify_code(used, &code).unwrap().duplicate);

    // Past the idle record's TTL but inside the used record's grace window
    clock.advance(Duration::seconds(15));
    assert_eq!(service.store().sweep(clock.now()).unwrap(), 1);
    assert!(service.verify_code(used, &code).unwrap().duplicate);
    assert_eq!(
        service.verify_code(idle, "000000").unwrap_err(),
        DomainError::NotFound
    );

    clock.advance(Duration::minutes(1));
    assert_eq!(service.store().sweep(clock.now()).unwrap(), 1);
    assert!(service.store().is_empty());
    assert_eq!(
        service.verify_code(used, &code).unwrap_err(),
        DomainError::NotFound
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_distinct_phones() {
    let (service, sms, _clock) = service_with_clock();
    let service = Arc::new(service);

    let mut tasks = Vec::new();
    for i in 0..40 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .request_code(&format!("+1416555{:04}", i))
                .await
                .map(|sent| sent.phone)
        }));
    }

    for task in tasks {
        let phone = task.await.unwrap().unwrap();
        let code = sms.code_for(&phone).unwrap();
        assert!(service.verify_code(&phone, &code).is_ok());
    }
    assert_eq!(service.store().len(), 40);
}
