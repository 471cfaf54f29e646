// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instrumented in-memory store for deterministic testing.
//!
//! `MemoryStore` implements `StatsStore` with two state copies: the **live**
//! state the accessors operate on, and the **durable** state that `save()`
//! copies into and `load()` restores from, simulating a persisted file.
//! Instrumentation covers save/load call counts, injectable failures, a
//! configurable save delay, and detection of overlapping `save()` calls.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use statforge_core::types::{BuildRecord, ChartConfig};
use statforge_core::{StatforgeError, StatsStore};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    results: Vec<BuildRecord>,
    configurations: Vec<ChartConfig>,
}

/// In-memory mock of a build-statistics store.
#[derive(Default)]
pub struct MemoryStore {
    live: Mutex<MemoryState>,
    durable: Mutex<MemoryState>,
    save_calls: AtomicU64,
    load_calls: AtomicU64,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    save_delay_ms: AtomicU64,
    in_save: AtomicBool,
    overlapping_saves: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store with no instrumentation armed.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_live(&self) -> MutexGuard<'_, MemoryState> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_durable(&self) -> MutexGuard<'_, MemoryState> {
        self.durable.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of `save()` calls made so far, including failed ones.
    pub fn save_calls(&self) -> u64 {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Number of `load()` calls made so far, including failed ones.
    pub fn load_calls(&self) -> u64 {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `save()` calls fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `load()` calls fail (or succeed again).
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Hold each `save()` open for `ms` milliseconds, widening the window in
    /// which an overlapping save would be caught.
    pub fn set_save_delay_ms(&self, ms: u64) {
        self.save_delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Whether two `save()` calls were ever in flight at once.
    pub fn overlapping_saves(&self) -> bool {
        self.overlapping_saves.load(Ordering::SeqCst)
    }

    /// The results most recently persisted by a successful `save()`.
    pub fn durable_results(&self) -> Vec<BuildRecord> {
        self.lock_durable().results.clone()
    }

    /// The configurations most recently persisted by a successful `save()`.
    pub fn durable_configurations(&self) -> Vec<ChartConfig> {
        self.lock_durable().configurations.clone()
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn load(&self) -> Result<(), StatforgeError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StatforgeError::Store {
                source: "injected load failure".into(),
            });
        }
        let durable = self.lock_durable().clone();
        *self.lock_live() = durable;
        Ok(())
    }

    async fn save(&self) -> Result<(), StatforgeError> {
        if self.in_save.swap(true, Ordering::SeqCst) {
            self.overlapping_saves.store(true, Ordering::SeqCst);
        }

        let delay = self.save_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_saves.load(Ordering::SeqCst) {
            Err(StatforgeError::Store {
                source: "injected save failure".into(),
            })
        } else {
            let live = self.lock_live().clone();
            *self.lock_durable() = live;
            Ok(())
        };

        self.in_save.store(false, Ordering::SeqCst);
        result
    }

    fn results(&self) -> Vec<BuildRecord> {
        self.lock_live().results.clone()
    }

    fn remove_results(&self, records: &[BuildRecord]) {
        self.lock_live().results.retain(|r| !records.contains(r));
    }

    fn add_results(&self, records: Vec<BuildRecord>) {
        self.lock_live().results.extend(records);
    }

    fn configurations(&self) -> Vec<ChartConfig> {
        self.lock_live().configurations.clone()
    }

    fn replace_configurations(&self, configs: Vec<ChartConfig>) {
        self.lock_live().configurations = configs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statforge_core::types::BuildOutcome;

    fn make_record(job: &str, number: u32) -> BuildRecord {
        BuildRecord {
            job_name: job.to_string(),
            build_number: number,
            outcome: BuildOutcome::Failure,
            started_at: "2026-03-01T12:00:00.000Z".to_string(),
            duration_ms: 5_000,
            node_name: String::new(),
        }
    }

    #[tokio::test]
    async fn save_copies_live_to_durable() {
        let store = MemoryStore::new();
        store.add_results(vec![make_record("a", 1)]);
        assert!(store.durable_results().is_empty());

        store.save().await.unwrap();
        assert_eq!(store.durable_results(), vec![make_record("a", 1)]);
        assert_eq!(store.save_calls(), 1);
    }

    #[tokio::test]
    async fn load_restores_durable_state() {
        let store = MemoryStore::new();
        store.add_results(vec![make_record("a", 1)]);
        store.save().await.unwrap();

        store.add_results(vec![make_record("a", 2)]);
        store.load().await.unwrap();
        assert_eq!(store.results(), vec![make_record("a", 1)]);
    }

    #[tokio::test]
    async fn injected_save_failure_leaves_durable_untouched() {
        let store = MemoryStore::new();
        store.add_results(vec![make_record("a", 1)]);
        store.fail_saves(true);

        assert!(store.save().await.is_err());
        assert!(store.durable_results().is_empty());
        assert_eq!(store.save_calls(), 1, "failed saves still count");
    }

    #[tokio::test]
    async fn injected_load_failure_leaves_live_untouched() {
        let store = MemoryStore::new();
        store.add_results(vec![make_record("a", 1)]);
        store.fail_loads(true);

        assert!(store.load().await.is_err());
        assert_eq!(store.results(), vec![make_record("a", 1)]);
    }

    #[tokio::test]
    async fn sequential_saves_are_not_flagged_as_overlapping() {
        let store = MemoryStore::new();
        store.save().await.unwrap();
        store.save().await.unwrap();
        assert!(!store.overlapping_saves());
    }
}
