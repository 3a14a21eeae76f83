//! Shared test support utilities.
//!
//! This module provides graph fixtures, a recording field visitor and
//! log setup for integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod visitors;

/// Route `tracing` output through the test harness.
///
/// Honors `RUST_LOG`, defaulting to `debug`; safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
