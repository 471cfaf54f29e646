// SPDX-FileCopyrightText: 2026 Statforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types: recorded build results and chart configurations.
//!
//! Both [`BuildRecord`] and [`ChartConfig`] use whole-value equality. The
//! saver relies on this: the remove queue matches records by equality, and
//! the flush no-op check compares entire configuration lists.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Outcome of a completed build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum BuildOutcome {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
}

/// A single recorded build result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Full name of the job that produced the build.
    pub job_name: String,
    /// Build number within the job.
    pub build_number: u32,
    /// Final outcome of the build.
    pub outcome: BuildOutcome,
    /// ISO 8601 timestamp of when the build started.
    pub started_at: String,
    /// Wall-clock duration of the build in milliseconds.
    pub duration_ms: u64,
    /// Name of the node the build ran on. Empty string for the controller.
    pub node_name: String,
}

impl BuildRecord {
    /// Create a record for a build that just completed, stamped with the
    /// current UTC time.
    pub fn new(
        job_name: String,
        build_number: u32,
        outcome: BuildOutcome,
        duration_ms: u64,
        node_name: String,
    ) -> Self {
        Self {
            job_name,
            build_number,
            outcome,
            started_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            duration_ms,
            node_name,
        }
    }
}

/// Time bucket used to aggregate results on a chart's x-axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum HistoricScale {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Quantity plotted on a chart's y-axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum YAxisKind {
    /// Number of builds per bucket.
    BuildCount,
    /// Mean build duration per bucket.
    AverageDuration,
    /// Summed build duration per bucket.
    TotalDuration,
}

/// A user-defined chart over the recorded build results.
///
/// Unlike build records, configurations are edited in place after creation,
/// so the saver shares one live list rather than add/remove deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Unique configuration identifier (UUID v4).
    pub id: String,
    /// Chart title shown to users.
    pub title: String,
    /// X-axis aggregation bucket.
    pub scale: HistoricScale,
    /// Y-axis quantity.
    pub y_axis: YAxisKind,
    /// Rendered chart width in pixels.
    pub width: u32,
    /// Rendered chart height in pixels.
    pub height: u32,
    /// Optional regex restricting which jobs feed the chart.
    pub job_filter: Option<String>,
}

impl ChartConfig {
    /// Create a configuration with a fresh id and default dimensions.
    pub fn new(title: String, scale: HistoricScale, y_axis: YAxisKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            scale,
            y_axis,
            width: 400,
            height: 300,
            job_filter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn build_outcome_display_round_trips() {
        for outcome in [
            BuildOutcome::Success,
            BuildOutcome::Failure,
            BuildOutcome::Unstable,
            BuildOutcome::Aborted,
            BuildOutcome::NotBuilt,
        ] {
            let s = outcome.to_string();
            let parsed = BuildOutcome::from_str(&s).expect("should parse back");
            assert_eq!(outcome, parsed);
        }
    }

    #[test]
    fn build_record_serde_round_trip() {
        let record = BuildRecord {
            job_name: "core/pipeline".to_string(),
            build_number: 42,
            outcome: BuildOutcome::Unstable,
            started_at: "2026-03-01T12:00:00.000Z".to_string(),
            duration_ms: 93_000,
            node_name: "agent-7".to_string(),
        };
        let json = serde_json::to_string(&record).expect("should serialize");
        let parsed: BuildRecord = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(record, parsed);
    }

    #[test]
    fn build_record_equality_is_whole_value() {
        let a = BuildRecord {
            job_name: "job".to_string(),
            build_number: 1,
            outcome: BuildOutcome::Success,
            started_at: "2026-03-01T12:00:00.000Z".to_string(),
            duration_ms: 1000,
            node_name: String::new(),
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.duration_ms = 1001;
        assert_ne!(a, b, "any differing field must break equality");
    }

    #[test]
    fn chart_config_new_generates_unique_ids() {
        let c1 = ChartConfig::new(
            "Failures per day".to_string(),
            HistoricScale::Daily,
            YAxisKind::BuildCount,
        );
        let c2 = ChartConfig::new(
            "Failures per day".to_string(),
            HistoricScale::Daily,
            YAxisKind::BuildCount,
        );
        assert_ne!(c1.id, c2.id);
        assert_eq!(c1.width, 400);
        assert_eq!(c1.height, 300);
        assert!(c1.job_filter.is_none());
    }

    #[test]
    fn chart_config_equality_tracks_in_place_edits() {
        let c1 = ChartConfig::new(
            "Durations".to_string(),
            HistoricScale::Weekly,
            YAxisKind::AverageDuration,
        );
        let mut c2 = c1.clone();
        assert_eq!(c1, c2);
        c2.title = "Durations (weekly)".to_string();
        assert_ne!(c1, c2);
    }
}
