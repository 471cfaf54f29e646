// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-change buffers shared between mutation intake and the writer lane.
//!
//! Three independently locked containers hold mutation intent until a flush
//! consumes it. Results are tracked as add/remove queues; chart
//! configurations are edited in place, so the entire live list is shared and
//! snapshotted wholesale instead of tracked as deltas. Each lock is held
//! only for the duration of an append/copy/clear, never across I/O, and no
//! operation is observable half-applied.

use std::sync::{Mutex, MutexGuard, PoisonError};

use statforge_core::types::{BuildRecord, ChartConfig};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory holding area for mutations not yet durably persisted.
#[derive(Debug, Default)]
pub struct PendingBuffers {
    /// Hand-off queue of records awaiting addition to the store.
    results_to_add: Mutex<Vec<BuildRecord>>,
    /// Hand-off queue of records awaiting removal from the store.
    results_to_remove: Mutex<Vec<BuildRecord>>,
    /// Live chart-configuration list. Entries are updated in place, so the
    /// whole list is shared rather than split into to-add/to-remove queues.
    chart_configs: Mutex<Vec<ChartConfig>>,
}

impl PendingBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with write access to all three buffers.
    ///
    /// Locks are taken in a fixed order (add, remove, configs); this is the
    /// only path that holds more than one buffer lock at a time.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<BuildRecord>, &mut Vec<BuildRecord>, &mut Vec<ChartConfig>),
    {
        let mut to_add = lock(&self.results_to_add);
        let mut to_remove = lock(&self.results_to_remove);
        let mut configs = lock(&self.chart_configs);
        f(&mut to_add, &mut to_remove, &mut configs);
    }

    /// Atomically move all queued additions out of the buffer.
    pub fn drain_additions(&self) -> Vec<BuildRecord> {
        std::mem::take(&mut *lock(&self.results_to_add))
    }

    /// Atomically move all queued removals out of the buffer.
    pub fn drain_removals(&self) -> Vec<BuildRecord> {
        std::mem::take(&mut *lock(&self.results_to_remove))
    }

    /// Point-in-time copy of the queued additions.
    pub fn additions(&self) -> Vec<BuildRecord> {
        lock(&self.results_to_add).clone()
    }

    /// Point-in-time copy of the queued removals.
    pub fn removals(&self) -> Vec<BuildRecord> {
        lock(&self.results_to_remove).clone()
    }

    /// Point-in-time copy of the live configuration list. The list is not
    /// cleared: it is the canonical state, not a delta queue.
    pub fn configurations(&self) -> Vec<ChartConfig> {
        lock(&self.chart_configs).clone()
    }

    /// Replace the configuration list wholesale.
    pub fn replace_configurations(&self, configs: Vec<ChartConfig>) {
        *lock(&self.chart_configs) = configs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use statforge_core::types::{BuildOutcome, HistoricScale, YAxisKind};

    fn make_record(job: &str, number: u32) -> BuildRecord {
        BuildRecord {
            job_name: job.to_string(),
            build_number: number,
            outcome: BuildOutcome::Success,
            started_at: "2026-03-01T12:00:00.000Z".to_string(),
            duration_ms: 1_000,
            node_name: String::new(),
        }
    }

    fn make_chart(title: &str) -> ChartConfig {
        ChartConfig::new(
            title.to_string(),
            HistoricScale::Daily,
            YAxisKind::BuildCount,
        )
    }

    #[test]
    fn update_appends_are_visible_in_snapshots() {
        let buffers = PendingBuffers::new();
        buffers.update(|to_add, to_remove, configs| {
            to_add.push(make_record("a", 1));
            to_remove.push(make_record("b", 2));
            configs.push(make_chart("Builds"));
        });

        assert_eq!(buffers.additions(), vec![make_record("a", 1)]);
        assert_eq!(buffers.removals(), vec![make_record("b", 2)]);
        assert_eq!(buffers.configurations().len(), 1);
    }

    #[test]
    fn drain_empties_the_queue_and_returns_contents_in_order() {
        let buffers = PendingBuffers::new();
        buffers.update(|to_add, _, _| {
            to_add.push(make_record("a", 1));
            to_add.push(make_record("a", 2));
        });

        let drained = buffers.drain_additions();
        assert_eq!(drained, vec![make_record("a", 1), make_record("a", 2)]);
        assert!(buffers.additions().is_empty());
    }

    #[test]
    fn drain_does_not_touch_other_buffers() {
        let buffers = PendingBuffers::new();
        buffers.update(|to_add, to_remove, configs| {
            to_add.push(make_record("a", 1));
            to_remove.push(make_record("b", 1));
            configs.push(make_chart("Builds"));
        });

        buffers.drain_additions();
        assert_eq!(buffers.removals().len(), 1);
        assert_eq!(buffers.configurations().len(), 1);
    }

    #[test]
    fn configurations_snapshot_does_not_clear_the_live_list() {
        let buffers = PendingBuffers::new();
        buffers.update(|_, _, configs| configs.push(make_chart("Builds")));

        let snapshot = buffers.configurations();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(buffers.configurations().len(), 1);
    }

    #[test]
    fn in_place_config_edits_are_visible_to_later_snapshots() {
        let buffers = PendingBuffers::new();
        buffers.update(|_, _, configs| configs.push(make_chart("Builds")));
        buffers.update(|_, _, configs| configs[0].title = "Builds per week".to_string());

        assert_eq!(buffers.configurations()[0].title, "Builds per week");
    }

    #[test]
    fn replace_configurations_swaps_the_list_wholesale() {
        let buffers = PendingBuffers::new();
        buffers.update(|_, _, configs| configs.push(make_chart("Old")));

        buffers.replace_configurations(vec![make_chart("New 1"), make_chart("New 2")]);
        let titles: Vec<_> = buffers
            .configurations()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["New 1", "New 2"]);
    }

    proptest! {
        /// Any interleaving of appends and drains neither loses nor
        /// duplicates a queued record, and preserves append order.
        #[test]
        fn drained_plus_pending_equals_everything_appended(
            batches in prop::collection::vec(prop::collection::vec(0u32..100, 0..5), 1..8),
        ) {
            let buffers = PendingBuffers::new();
            let mut appended = Vec::new();
            let mut drained = Vec::new();

            for batch in &batches {
                buffers.update(|to_add, _, _| {
                    for &n in batch {
                        to_add.push(make_record("job", n));
                    }
                });
                appended.extend(batch.iter().map(|&n| make_record("job", n)));

                // Drain after every other batch to interleave.
                if batch.len() % 2 == 0 {
                    drained.extend(buffers.drain_additions());
                }
            }
            drained.extend(buffers.drain_additions());

            prop_assert_eq!(drained, appended);
        }
    }
}
