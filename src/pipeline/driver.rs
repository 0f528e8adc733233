//! The per-file conversion driver (§6): reads a document, lets a caller-
//! supplied transform mutate it, validates the result, and only then commits
//! the write — backing up the original first and rolling back on any
//! failure along the way.

use super::log_channels::LogChannels;
use crate::error::{Error, Result};
use crate::fileformat::FileFormat;
use crate::model::Document;
use crate::validators::{validate_content, validate_round_trip_equality};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of driving one file through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The file was transformed, validated, and written back successfully.
    Committed,
    /// The transform or validation failed; the original file was restored
    /// from its backup unchanged.
    RolledBack {
        /// Human-readable reason the drive was rolled back.
        reason: String,
    },
}

/// Drives a [`FileFormat`] adapter through the read/transform/validate/write
/// cycle for one file at a time, logging every step to its
/// [`LogChannels`].
pub struct ConversionDriver {
    log: LogChannels,
}

impl ConversionDriver {
    /// Create a new driver with empty log channels.
    pub fn new() -> Self {
        Self { log: LogChannels::new() }
    }

    /// The driver's accumulated log channels.
    pub fn log(&self) -> &LogChannels {
        &self.log
    }

    /// Drive `format` through one file at `path`:
    ///
    /// 1. Copy `path` to a sibling backup file.
    /// 2. Read the document via `format`.
    /// 3. Apply `transform` to the in-memory document.
    /// 4. Run the content-validator on the transformed document; its result
    ///    is logged to the `ugh` channel but does not abort the drive.
    /// 5. Deep-copy the transformed document and validate it against itself
    ///    for round-trip equality, catching a transform that leaves the
    ///    document in a self-inconsistent state.
    /// 6. Write the transformed document back via `format`.
    /// 7. On success, delete the backup and return [`DriveOutcome::Committed`].
    /// 8. On any failure from steps 2-6, restore the backup over `path` and
    ///    return [`DriveOutcome::RolledBack`] rather than propagating the
    ///    error — a single bad file must not stop a batch run (§6).
    pub fn drive(&mut self, format: &mut dyn FileFormat, path: &Path, transform: impl FnOnce(&mut Document) -> Result<()>) -> DriveOutcome {
        match self.try_drive(format, path, transform) {
            Ok(()) => {
                self.log.commit(format!("{} committed", path.display()));
                DriveOutcome::Committed
            },
            Err(e) => {
                let reason = e.to_string();
                if let Err(restore_err) = self.restore_backup(path) {
                    self.log.rollback(format!(
                        "{} failed ({reason}) and backup restore also failed: {restore_err}",
                        path.display()
                    ));
                } else {
                    self.log.rollback(format!("{} rolled back: {reason}", path.display()));
                }
                DriveOutcome::RolledBack { reason }
            },
        }
    }

    fn try_drive(&mut self, format: &mut dyn FileFormat, path: &Path, transform: impl FnOnce(&mut Document) -> Result<()>) -> Result<()> {
        self.make_backup(path)?;

        format.read(path)?;
        let mut document = format
            .get_document()
            .cloned()
            .ok_or_else(|| Error::ReadException(format!("{} produced no document", path.display())))?;

        transform(&mut document)?;

        let issues = validate_content(&document, document.rule_set(), &path.display().to_string());
        if !issues.is_empty() {
            self.log.ugh(format!("{} content-validator found {} issue(s)", path.display(), issues.len()));
        }

        let round_tripped = document.copy()?;
        if !validate_round_trip_equality(&document, &round_tripped) {
            return Err(Error::PreferencesException("transformed document failed self round-trip equality".to_string()));
        }

        format.set_document(document);
        format.write(path)?;
        self.log.save(format!("{} saved", path.display()));
        self.delete_backup(path);
        Ok(())
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn make_backup(&mut self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::copy(path, Self::backup_path(path)).map_err(Error::Io)?;
        }
        Ok(())
    }

    fn restore_backup(&mut self, path: &Path) -> Result<()> {
        let backup = Self::backup_path(path);
        if backup.exists() {
            fs::copy(&backup, path).map_err(Error::Io)?;
            fs::remove_file(&backup).map_err(Error::Io)?;
        }
        Ok(())
    }

    fn delete_backup(&mut self, path: &Path) {
        let backup = Self::backup_path(path);
        if backup.exists() {
            let _ = fs::remove_file(&backup);
        }
    }
}

impl Default for ConversionDriver {
    fn default() -> Self {
        Self::new()
    }
}
