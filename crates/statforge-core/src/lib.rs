// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the statforge build-statistics service.
//!
//! This crate provides the error type, the domain model (build records and
//! chart configurations), and the [`StatsStore`] collaborator trait that
//! persistence backends implement. The deferred-save coordinator lives in
//! `statforge-saver`; the file-backed store lives in `statforge-store`.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StatforgeError;
pub use traits::StatsStore;
pub use types::{BuildOutcome, BuildRecord, ChartConfig, HistoricScale, YAxisKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statforge_error_has_all_variants() {
        let _config = StatforgeError::Config("test".into());
        let _store = StatforgeError::Store {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = StatforgeError::Internal("test".into());
    }

    #[test]
    fn stats_store_is_object_safe() {
        // The saver holds stores behind Arc<S>, but dyn usage must stay possible
        // for test doubles and adapters.
        fn _assert_object_safe(_: &dyn StatsStore) {}
    }
}
