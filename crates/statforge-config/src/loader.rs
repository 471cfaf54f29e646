// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./statforge.toml` > `~/.config/statforge/statforge.toml`
//! > `/etc/statforge/statforge.toml` with environment variable overrides via the
//! `STATFORGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StatforgeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/statforge/statforge.toml` (system-wide)
/// 3. `~/.config/statforge/statforge.toml` (user XDG config)
/// 4. `./statforge.toml` (local directory)
/// 5. `STATFORGE_*` environment variables
pub fn load_config() -> Result<StatforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StatforgeConfig::default()))
        .merge(Toml::file("/etc/statforge/statforge.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("statforge/statforge.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("statforge.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<StatforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StatforgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StatforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StatforgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that key names which
/// themselves contain underscores stay intact: `STATFORGE_STORAGE_DATA_FILE`
/// must map to `storage.data_file`, not `storage.data.file`.
fn env_provider() -> Env {
    Env::prefixed("STATFORGE_").map(|key| {
        // `key` is the env var name with the prefix stripped. Normalize to
        // lowercase so the section-prefix replacements below match regardless
        // of how the underlying provider cases the key.
        // Example: STATFORGE_STORAGE_DATA_FILE -> "storage_data_file"
        let key_str = key.as_str().to_lowercase();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
