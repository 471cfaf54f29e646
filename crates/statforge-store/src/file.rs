// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed snapshot store.
//!
//! The whole store state is serialized as one JSON document. Saves write to
//! a sibling `.tmp` file first and rename over the target, so readers never
//! observe a half-written snapshot. Save cost grows with the record set,
//! which is exactly why the saver batches mutations instead of saving on
//! every one.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use statforge_config::StorageConfig;
use statforge_core::types::{BuildRecord, ChartConfig};
use statforge_core::{StatforgeError, StatsStore};

/// Serialized layout of the snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    results: Vec<BuildRecord>,
    configurations: Vec<ChartConfig>,
}

/// Wrap an I/O error as a store error.
fn map_io_err(e: std::io::Error) -> StatforgeError {
    StatforgeError::Store { source: Box::new(e) }
}

/// Wrap a JSON (de)serialization error as a store error.
fn map_json_err(e: serde_json::Error) -> StatforgeError {
    StatforgeError::Store { source: Box::new(e) }
}

/// JSON snapshot store for build results and chart configurations.
///
/// In-memory state lives behind one mutex, held only for copy/mutate, never
/// across I/O. `save()` serializes a point-in-time copy of the state.
pub struct FileStore {
    path: PathBuf,
    pretty: bool,
    state: Mutex<StoreState>,
}

impl FileStore {
    /// Create a store persisting to `path`. No I/O happens until
    /// `load()`/`save()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Create a store from the storage configuration section.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            path: PathBuf::from(&config.data_file),
            pretty: config.pretty,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl StatsStore for FileStore {
    async fn load(&self) -> Result<(), StatforgeError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // First run: nothing persisted yet, keep the empty state.
                debug!(path = %self.path.display(), "no snapshot file yet");
                return Ok(());
            }
            Err(e) => return Err(map_io_err(e)),
        };
        let loaded: StoreState = serde_json::from_slice(&bytes).map_err(map_json_err)?;
        debug!(
            path = %self.path.display(),
            results = loaded.results.len(),
            configurations = loaded.configurations.len(),
            "snapshot loaded"
        );
        *self.lock() = loaded;
        Ok(())
    }

    async fn save(&self) -> Result<(), StatforgeError> {
        let snapshot = self.lock().clone();
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&snapshot)
        } else {
            serde_json::to_vec(&snapshot)
        }
        .map_err(map_json_err)?;

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await.map_err(map_io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(map_io_err)?;

        debug!(
            path = %self.path.display(),
            results = snapshot.results.len(),
            configurations = snapshot.configurations.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn results(&self) -> Vec<BuildRecord> {
        self.lock().results.clone()
    }

    fn remove_results(&self, records: &[BuildRecord]) {
        self.lock().results.retain(|r| !records.contains(r));
    }

    fn add_results(&self, records: Vec<BuildRecord>) {
        self.lock().results.extend(records);
    }

    fn configurations(&self) -> Vec<ChartConfig> {
        self.lock().configurations.clone()
    }

    fn replace_configurations(&self, configs: Vec<ChartConfig>) {
        self.lock().configurations = configs;
    }
}
