//! Tests for the verification lifecycle
