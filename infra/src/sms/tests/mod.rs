//! Unit tests for SMS module

mod sms_service_tests;
