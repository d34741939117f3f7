//! Integration tests for vm-preflight.
//!
//! These tests run whole phases against mock drivers and hosts.

pub mod full_run_tests;
