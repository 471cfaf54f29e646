// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The deferred-save coordinator.
//!
//! [`StatsSaver`] is the single access point for mutating persisted build
//! statistics. Callers describe their change against the pending buffers and
//! return immediately; a dedicated writer lane (one task consuming an
//! unbounded job queue) drains the buffers and performs the expensive store
//! save off the callers' execution path. Because the lane runs at most one
//! job at a time, the store needs no additional locking around the
//! apply-and-save sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use statforge_core::StatsStore;
use statforge_core::types::{BuildRecord, ChartConfig};

use crate::buffers::PendingBuffers;

/// Writer-lane activity counters.
#[derive(Debug, Default)]
struct SaverStats {
    flushes: AtomicU64,
    saves: AtomicU64,
    noop_skips: AtomicU64,
    save_failures: AtomicU64,
}

impl SaverStats {
    fn snapshot(&self) -> SaverStatsSnapshot {
        SaverStatsSnapshot {
            flushes: self.flushes.load(Ordering::Relaxed),
            saves: self.saves.load(Ordering::Relaxed),
            noop_skips: self.noop_skips.load(Ordering::Relaxed),
            save_failures: self.save_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writer-lane activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaverStatsSnapshot {
    /// Flush jobs executed, including no-op skips.
    pub flushes: u64,
    /// Successful store saves.
    pub saves: u64,
    /// Flushes that found nothing to persist.
    pub noop_skips: u64,
    /// Saves that failed and were swallowed.
    pub save_failures: u64,
}

/// Jobs executed by the writer lane, strictly in submission order.
enum WriterJob {
    /// Drain the pending buffers and persist the result.
    Flush,
    /// Repopulate the configuration buffer from the store.
    Resync(oneshot::Sender<()>),
    /// Reload the store from durable storage, then repopulate.
    Reload(oneshot::Sender<()>),
    /// Ack once every previously queued job has run.
    Barrier(oneshot::Sender<()>),
    /// Ack and stop the lane.
    Shutdown(oneshot::Sender<()>),
}

/// Single access point for mutating and persisting build statistics.
///
/// Mutations submitted concurrently from any number of tasks are buffered
/// instantly and folded into one consistent store save by the writer lane.
/// A flush that finds nothing changed performs no save at all.
pub struct StatsSaver<S: StatsStore> {
    store: Arc<S>,
    pending: Arc<PendingBuffers>,
    stats: Arc<SaverStats>,
    jobs: mpsc::UnboundedSender<WriterJob>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl<S: StatsStore> StatsSaver<S> {
    /// Create a saver driving `store` and start its writer lane.
    ///
    /// Must be called within a Tokio runtime. The configuration buffer is
    /// populated from the store before this returns.
    pub fn new(store: Arc<S>) -> Self {
        let pending = Arc::new(PendingBuffers::new());
        let stats = Arc::new(SaverStats::default());
        let (jobs, rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(writer_loop(
            Arc::clone(&store),
            Arc::clone(&pending),
            Arc::clone(&stats),
            rx,
        ));

        pending.replace_configurations(store.configurations());

        Self {
            store,
            pending,
            stats,
            jobs,
            writer: Mutex::new(Some(writer)),
        }
    }

    /// Record a mutation and schedule it for persistence.
    ///
    /// `mutation` runs synchronously with write access to the add queue, the
    /// remove queue, and the live configuration list, so the change is
    /// visible to [`merged_results`](Self::merged_results) and
    /// [`current_configurations`](Self::current_configurations) as soon as
    /// this returns. As the record set grows, a full snapshot save becomes
    /// expensive, up to the order of seconds or more, so the save itself
    /// happens on the writer lane: exactly one flush job is queued per call,
    /// and a flush that finds nothing left to do (an earlier job already
    /// drained the changes) skips the save.
    ///
    /// Never blocks on I/O and never fails; save errors surface as warnings
    /// logged from the writer lane.
    pub fn submit<F>(&self, mutation: F)
    where
        F: FnOnce(&mut Vec<BuildRecord>, &mut Vec<BuildRecord>, &mut Vec<ChartConfig>),
    {
        self.pending.update(mutation);
        trace!("build stats update queued");

        if self.jobs.send(WriterJob::Flush).is_err() {
            warn!("writer lane is stopped; queued update will not be persisted");
        }
    }

    /// Current view of the result set: the store's results with queued
    /// removals subtracted and queued additions appended.
    ///
    /// Removals are evaluated before additions, matching flush order, so a
    /// record queued for both removal and re-addition is present. Safe to
    /// call concurrently with flushes; never blocks on the writer lane.
    pub fn merged_results(&self) -> Vec<BuildRecord> {
        let to_remove = self.pending.removals();
        let to_add = self.pending.additions();

        let mut merged = self.store.results();
        merged.retain(|r| !to_remove.contains(r));
        merged.extend(to_add);
        merged
    }

    /// Current view of the chart configurations.
    ///
    /// The live buffer is the single source of truth for configurations;
    /// there is nothing to merge from the store.
    pub fn current_configurations(&self) -> Vec<ChartConfig> {
        self.pending.configurations()
    }

    /// Writer-lane activity counters.
    pub fn stats(&self) -> SaverStatsSnapshot {
        self.stats.snapshot()
    }

    /// Repopulate the configuration buffer wholesale from the store.
    ///
    /// Runs on the writer lane so it can never interleave with a flush that
    /// is reading the configuration buffer; completes before returning.
    pub async fn resync(&self) {
        self.run_lane_job(WriterJob::Resync).await;
    }

    /// Reload the store from durable storage, then repopulate the
    /// configuration buffer.
    ///
    /// A load failure is logged and swallowed; repopulation then proceeds
    /// from whatever state the store holds in memory.
    pub async fn reload(&self) {
        self.run_lane_job(WriterJob::Reload).await;
    }

    /// Wait until every flush scheduled so far has completed.
    pub async fn quiesce(&self) {
        self.run_lane_job(WriterJob::Barrier).await;
    }

    /// Drain previously queued jobs, then stop the writer lane.
    ///
    /// Mutations submitted after shutdown stay in the pending buffers and
    /// are never persisted.
    pub async fn shutdown(&self) {
        self.run_lane_job(WriterJob::Shutdown).await;

        let handle = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                warn!("writer lane task aborted or panicked");
            }
        }
    }

    async fn run_lane_job(&self, job: fn(oneshot::Sender<()>) -> WriterJob) {
        let (tx, rx) = oneshot::channel();
        if self.jobs.send(job(tx)).is_ok() {
            let _ = rx.await;
        } else {
            debug!("writer lane is stopped; lifecycle job skipped");
        }
    }
}

/// The writer lane: one consumer draining the job queue in FIFO order.
async fn writer_loop<S: StatsStore>(
    store: Arc<S>,
    pending: Arc<PendingBuffers>,
    stats: Arc<SaverStats>,
    mut jobs: mpsc::UnboundedReceiver<WriterJob>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            WriterJob::Flush => run_flush(store.as_ref(), &pending, &stats).await,
            WriterJob::Resync(ack) => {
                pending.replace_configurations(store.configurations());
                let _ = ack.send(());
            }
            WriterJob::Reload(ack) => {
                if let Err(e) = store.load().await {
                    error!(error = %e, "failed to reload build statistics from storage");
                }
                pending.replace_configurations(store.configurations());
                let _ = ack.send(());
            }
            WriterJob::Barrier(ack) => {
                let _ = ack.send(());
            }
            WriterJob::Shutdown(ack) => {
                let _ = ack.send(());
                break;
            }
        }
    }
    debug!("writer lane stopped");
}

/// Execute one flush: drain the queues, detect no-ops, apply and save.
async fn run_flush<S: StatsStore>(store: &S, pending: &PendingBuffers, stats: &SaverStats) {
    trace!("processing build stats update queue");
    stats.flushes.fetch_add(1, Ordering::Relaxed);

    // Atomically move the queued changes into local snapshots. The
    // configuration list is copied without clearing: it is the live list,
    // not a delta queue.
    let to_add = pending.drain_additions();
    let to_remove = pending.drain_removals();
    let configs = pending.configurations();

    // An earlier job may have already drained changes that were queued in
    // bulk. The configuration check is a plain equality comparison against
    // the store, not a dirty flag.
    if to_add.is_empty() && to_remove.is_empty() && configs == store.configurations() {
        trace!("no change detected in update queue");
        stats.noop_skips.fetch_add(1, Ordering::Relaxed);
        return;
    }

    store.remove_results(&to_remove);
    store.add_results(to_add);
    store.replace_configurations(configs);

    match store.save().await {
        Ok(()) => {
            stats.saves.fetch_add(1, Ordering::Relaxed);
            trace!("changes applied and snapshot saved");
        }
        Err(e) => {
            // The store keeps the applied changes in memory; the next flush
            // that saves will persist them.
            stats.save_failures.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "failed to persist build statistics");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statforge_core::types::BuildOutcome;
    use statforge_test_utils::MemoryStore;

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

    #[tokio::test]
    async fn merged_view_subtracts_removals_then_appends_additions() {
        let store = Arc::new(MemoryStore::new());
        store.add_results(vec![make_record("a", 1), make_record("b", 1)]);

        let saver = StatsSaver::new(Arc::clone(&store));
        saver.submit(|to_add, to_remove, _| {
            to_remove.push(make_record("a", 1));
            to_add.push(make_record("c", 1));
        });

        let merged = saver.merged_results();
        assert_eq!(merged, vec![make_record("b", 1), make_record("c", 1)]);
    }

    #[tokio::test]
    async fn merged_view_add_wins_when_record_is_removed_and_readded() {
        let store = Arc::new(MemoryStore::new());
        store.add_results(vec![make_record("a", 1)]);

        let saver = StatsSaver::new(Arc::clone(&store));
        saver.submit(|to_add, to_remove, _| {
            to_remove.push(make_record("a", 1));
            to_add.push(make_record("a", 1));
        });

        assert_eq!(saver.merged_results(), vec![make_record("a", 1)]);
    }
}
