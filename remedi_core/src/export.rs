//! CSV export for the dose history log.
//!
//! Converts the append-only JSONL log into a CSV archive suitable for
//! spreadsheets or sharing with a clinician, with proper ordering of fsync
//! and rename to prevent data loss.

use crate::{Result, TakenRecord};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    medicine_id: String,
    name: String,
    dose_index: usize,
    taken_at: String,
}

impl From<&TakenRecord> for CsvRow {
    fn from(record: &TakenRecord) -> Self {
        CsvRow {
            medicine_id: record.medicine_id.clone(),
            name: record.name.clone(),
            dose_index: record.dose_index,
            taken_at: record.taken_at.to_rfc3339(),
        }
    }
}

/// Export the dose log to CSV and archive the log atomically.
///
/// Reads all records from the log, appends them to the CSV (writing headers
/// only when the file is new), fsyncs the CSV, then renames the log to
/// `.processed`. Returns the number of records exported. The log is renamed
/// rather than deleted so manual recovery stays possible.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = crate::doselog::read_records(log_path)?;

    if records.is_empty() {
        tracing::info!("No records in dose log to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} records to CSV", records.len());

    let processed_path = log_path.with_extension("log.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived dose log to {:?}", processed_path);

    Ok(records.len())
}

/// Remove all `.log.processed` files in the given directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed dose log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed dose logs", count);
    }

    Ok(count)
}
