//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the question-listing endpoint and
//! drive the real reqwest path end-to-end.

mod harvest_tests;
mod pager_tests;
mod support;
