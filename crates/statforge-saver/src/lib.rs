// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred, batched persistence coordinator for build statistics.
//!
//! Mutation requests arrive concurrently from many callers while a full
//! snapshot save is expensive and must stay serialized. [`StatsSaver`]
//! records each mutation instantly in pending buffers and folds all pending
//! intent into a single consistent save on a dedicated writer lane, skipping
//! the save entirely when nothing actually changed.

pub mod buffers;
pub mod saver;

pub use buffers::PendingBuffers;
pub use saver::{SaverStatsSnapshot, StatsSaver};
