//! Core domain types for the Remedi medication tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Raw medicine records and per-time schedule entries
//! - Dose status labels (engine states and display labels)
//! - Status window policy
//! - Expanded dose entries and summaries
//! - Dose-history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeparse;

// ============================================================================
// Schedule and Medicine Types
// ============================================================================

/// Rough time-of-day bucket a dose belongs to (display only)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
            Period::Evening => "evening",
            Period::Night => "night",
        }
    }
}

/// One scheduled dose-time for one medicine.
///
/// `time` is a 24-hour `HH:MM` string. The mere presence of `taken_at` is the
/// sole "taken" signal; how far it deviates from the scheduled time does not
/// matter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicineSchedule {
    pub id: String,
    pub name: String,
    pub time: String,
    pub dosage: String,
    pub period: Option<Period>,
    pub taken_at: Option<DateTime<Utc>>,
}

/// A raw medicine record as stored in the roster.
///
/// A medicine either has fixed dose-times (`times`, or the legacy single
/// `time` field) or is as-needed. All dose-times of one medicine share the
/// same `taken_at`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Medicine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub as_needed: bool,
    /// Legacy single dose-time, used when `times` is empty
    #[serde(default)]
    pub time: Option<String>,
    /// Dose-times as 12-hour display strings (e.g. "08:00 AM")
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
}

impl Medicine {
    /// Build a transient schedule entry for one of this medicine's dose-times.
    ///
    /// The display time string is normalized to 24-hour `HH:MM`; unparseable
    /// strings degrade to the `00:00` sentinel.
    pub fn schedule_for(&self, time: &str) -> MedicineSchedule {
        MedicineSchedule {
            id: self.id.clone(),
            name: self.name.clone(),
            time: timeparse::to_24_hour(time),
            dosage: self.dosage.clone(),
            period: self.period,
            taken_at: self.taken_at,
        }
    }
}

// ============================================================================
// Status Types
// ============================================================================

/// Terminal classification of a single scheduled dose-time
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Taken,
    Missed,
    Pending,
    Upcoming,
}

impl DoseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseStatus::Taken => "taken",
            DoseStatus::Missed => "missed",
            DoseStatus::Pending => "pending",
            DoseStatus::Upcoming => "upcoming",
        }
    }
}

/// Display label for an expanded dose entry.
///
/// Extends the engine states with `AsNeeded` (medicines without a schedule)
/// and `Overdue` (the "today" view's rename of `Missed`). These are view
/// relabelings, not engine states.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseLabel {
    Taken,
    Missed,
    Pending,
    Upcoming,
    AsNeeded,
    Overdue,
}

impl DoseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseLabel::Taken => "taken",
            DoseLabel::Missed => "missed",
            DoseLabel::Pending => "pending",
            DoseLabel::Upcoming => "upcoming",
            DoseLabel::AsNeeded => "as needed",
            DoseLabel::Overdue => "overdue",
        }
    }
}

impl From<DoseStatus> for DoseLabel {
    fn from(status: DoseStatus) -> Self {
        match status {
            DoseStatus::Taken => DoseLabel::Taken,
            DoseStatus::Missed => DoseLabel::Missed,
            DoseStatus::Pending => DoseLabel::Pending,
            DoseStatus::Upcoming => DoseLabel::Upcoming,
        }
    }
}

impl std::fmt::Display for DoseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Window Policy
// ============================================================================

/// Policy parameters controlling the pending window around a scheduled time.
///
/// A dose is `Pending` from `pending_window_before` minutes before its
/// scheduled time through `pending_window_after` minutes after it, endpoints
/// inclusive. Earlier is `Upcoming`, later is `Missed`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusConfig {
    pub pending_window_before: u32,
    pub pending_window_after: u32,
}

/// Default window policy: pending from 30 minutes before to 120 minutes after.
///
/// Passed explicitly at call sites; there is no module-level mutable default.
pub const DEFAULT_STATUS_CONFIG: StatusConfig = StatusConfig {
    pending_window_before: 30,
    pending_window_after: 120,
};

impl Default for StatusConfig {
    fn default() -> Self {
        DEFAULT_STATUS_CONFIG
    }
}

// ============================================================================
// Expanded Dose and Summary Types
// ============================================================================

/// One per-dose-time entry produced by the expander.
///
/// Ephemeral: rebuilt on every invocation, never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseEntry {
    /// Back-reference to the parent medicine
    pub original_id: String,
    pub name: String,
    pub dosage: String,
    pub period: Option<Period>,
    /// The dose-time as given in the medicine record (display string)
    pub time: String,
    /// 0-based position in the medicine's `times` array
    pub dose_index: usize,
    pub total_doses: usize,
    pub status: DoseLabel,
}

/// Per-status counts over a list of schedules for one date
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: usize,
    pub taken: usize,
    pub missed: usize,
    pub pending: usize,
    pub upcoming: usize,
}

// ============================================================================
// Dose History
// ============================================================================

/// One confirmed dose intake, appended to the dose log when a medicine is
/// marked taken
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TakenRecord {
    pub medicine_id: String,
    pub name: String,
    pub dose_index: usize,
    pub taken_at: DateTime<Utc>,
}
