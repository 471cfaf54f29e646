// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for build-statistics persistence backends.

use async_trait::async_trait;

use crate::error::StatforgeError;
use crate::types::{BuildRecord, ChartConfig};

/// A durable store of build results and chart configurations.
///
/// Implementations own the persisted-state layout (file format, paths,
/// retries) and synchronize their in-memory state internally. The accessor
/// methods return point-in-time copies and apply bulk mutations atomically;
/// they never perform I/O. Only [`load`](StatsStore::load) and
/// [`save`](StatsStore::save) touch durable storage.
///
/// While a `StatsSaver` is driving a store, the saver's writer lane is the
/// only caller of the mutating methods and of `save()`, so implementations
/// do not need to support concurrent writers.
#[async_trait]
pub trait StatsStore: Send + Sync + 'static {
    /// Repopulate in-memory state from durable storage.
    async fn load(&self) -> Result<(), StatforgeError>;

    /// Persist the current in-memory state durably.
    async fn save(&self) -> Result<(), StatforgeError>;

    /// Point-in-time copy of the stored result set.
    fn results(&self) -> Vec<BuildRecord>;

    /// Remove every stored result equal to any record in `records`.
    fn remove_results(&self, records: &[BuildRecord]);

    /// Append `records` to the stored result set.
    fn add_results(&self, records: Vec<BuildRecord>);

    /// Point-in-time copy of the stored chart configurations.
    fn configurations(&self) -> Vec<ChartConfig>;

    /// Replace the stored chart configurations wholesale.
    fn replace_configurations(&self, configs: Vec<ChartConfig>);
}
