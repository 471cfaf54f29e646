// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the statforge workspace.
//!
//! Provides [`MemoryStore`], an instrumented in-memory [`StatsStore`]
//! implementation with failure injection and single-flight save detection,
//! plus a logging initializer for integration tests.

pub mod mock_store;

pub use mock_store::MemoryStore;

/// Initialize tracing output for tests, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
