//! Unit tests - public API checks that need no files or environment

mod fingerprint_tests;
mod planner_api_tests;
