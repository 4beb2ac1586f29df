//! Medicine roster persistence with file locking.
//!
//! The roster is the local stand-in for the external data-access layer: a
//! JSON file holding the user's medicine records. Reads take a shared lock,
//! writes go through a temp file and an atomic rename so a crash never
//! leaves a half-written roster behind.

use crate::{Error, Medicine, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// The user's medicine list
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct MedicineRoster {
    pub medicines: Vec<Medicine>,
}

impl MedicineRoster {
    /// Load the roster from a file with shared locking.
    ///
    /// Returns an empty roster if the file doesn't exist. A corrupt file
    /// logs a warning and also yields an empty roster.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No roster file found, starting empty");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open roster {:?}: {}. Starting empty.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock roster {:?}: {}. Starting empty.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read roster {:?}: {}. Starting empty.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<MedicineRoster>(&contents) {
            Ok(roster) => {
                tracing::debug!("Loaded {} medicines from {:?}", roster.medicines.len(), path);
                Ok(roster)
            }
            Err(e) => {
                tracing::warn!("Failed to parse roster {:?}: {}. Starting empty.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the roster with exclusive locking.
    ///
    /// Writes to a temp file in the same directory, fsyncs, then renames
    /// over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "roster path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved roster to {:?}", path);
        Ok(())
    }

    /// Load the roster, modify it, and save it back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut MedicineRoster) -> Result<()>,
    {
        let mut roster = Self::load(path)?;
        f(&mut roster)?;
        roster.save(path)?;
        Ok(roster)
    }

    /// Look up a medicine by id
    pub fn find(&self, id: &str) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.id == id)
    }

    /// Set `taken_at` for a medicine. Returns false if the id is unknown.
    pub fn mark_taken(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        match self.medicines.iter_mut().find(|m| m.id == id) {
            Some(medicine) => {
                medicine.taken_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Clear `taken_at` on every medicine (start-of-day reset).
    ///
    /// Returns how many medicines were actually cleared.
    pub fn clear_taken(&mut self) -> usize {
        let mut cleared = 0;
        for medicine in &mut self.medicines {
            if medicine.taken_at.take().is_some() {
                cleared += 1;
            }
        }
        cleared
    }
}
