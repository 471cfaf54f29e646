// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON snapshot persistence backend for statforge.
//!
//! Provides [`FileStore`], a [`StatsStore`](statforge_core::StatsStore)
//! implementation that keeps the full result set and configuration list in
//! memory and persists them as one JSON snapshot file, replaced atomically
//! on every save.

pub mod file;

pub use file::FileStore;

// Convenience re-exports of the domain types the store persists.
pub use statforge_core::types::{BuildRecord, ChartConfig};
