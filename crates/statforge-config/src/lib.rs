// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the statforge build-statistics service.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = statforge_config::load_config().expect("config errors");
//! println!("data file: {}", config.storage.data_file);
//! ```

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ServiceConfig, StatforgeConfig, StorageConfig};
