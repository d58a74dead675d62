//! Integration tests - schema YAML through planning to the written join plan
//!
//! These tests drive the public pipeline end to end. Generation tests write
//! into temporary directories only.

mod generation_tests;
mod scenario_tests;
