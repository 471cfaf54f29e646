// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits implemented by persistence backends.

pub mod store;

pub use store::StatsStore;
