#![forbid(unsafe_code)]

//! Core domain model and business logic for the Remedi medication tracker.
//!
//! This crate provides:
//! - Domain types (medicines, schedules, dose statuses)
//! - Time string parsing (12-hour display strings to 24-hour/minutes)
//! - The dose status calculator and derived folds
//! - Dose expansion for display
//! - Persistence (roster, dose log, CSV export)

pub mod types;
pub mod error;
pub mod timeparse;
pub mod status;
pub mod expand;
pub mod config;
pub mod logging;
pub mod roster;
pub mod doselog;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use status::{classify, has_missed, same_day, start_of_day, statuses_for, summarize};
pub use expand::{expand_doses, flatten_schedules, relabel_missed_as_overdue, sort_chronological};
pub use timeparse::{minutes_since_midnight, to_24_hour};
pub use roster::MedicineRoster;
pub use doselog::{read_records, JsonlSink, RecordSink};
pub use export::log_to_csv_and_archive;
