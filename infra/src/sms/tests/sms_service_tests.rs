//! Unit tests for SMS service helpers

use crate::sms::sms_service::{validate_outbound, MAX_MESSAGE_LENGTH};
use crate::sms::{is_valid_phone_number, mask_phone_number};
use crate::InfrastructureError;

#[test]
fn test_mask_phone_number() {
    assert_eq!(mask_phone_number("+14165551234"), "+*******1234");
    assert_eq!(mask_phone_number("1234"), "****");
}

#[test]
fn test_is_valid_phone_number() {
    assert!(is_valid_phone_number("+14165551234"));
    assert!(is_valid_phone_number("+442071838750"));

    assert!(!is_valid_phone_number("14165551234")); // No plus
    assert!(!is_valid_phone_number("+0123456789")); // Leading zero
    assert!(!is_valid_phone_number("+1416abc1234"));
    assert!(!is_valid_phone_number("+"));
}

#[test]
fn test_validate_outbound() {
    assert!(validate_outbound("+14165551234", "Your code is 482193").is_ok());

    match validate_outbound("4165551234", "body") {
        Err(InfrastructureError::Sms(msg)) => {
            assert!(msg.contains("Invalid phone number"));
            // Only the last four digits may appear
            assert!(!msg.contains("416555"));
        }
        other => panic!("Expected Sms error, got {:?}", other),
    }

    assert!(validate_outbound("+14165551234", "").is_err());
    let too_long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
    assert!(validate_outbound("+14165551234", &too_long).is_err());
}
