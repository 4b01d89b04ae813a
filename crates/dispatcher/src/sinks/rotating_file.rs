//! RotatingFileSink - writes messages to a file, keeping timestamped backups
//!
//! On open, an existing file at `base_path` is renamed to
//! `<base_path>.<UTC timestamp>` and the oldest backups beyond `max_files` are
//! deleted. `max_files <= 0` turns rotation off: the sink appends to
//! `base_path` forever and never creates a backup.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use contracts::{globals, ContractError, LogSink, RotatingFileParams};
use observability::{record_backups_pruned, record_sink_dropped, record_sink_write};
use tracing::{debug, instrument, warn};

use crate::metrics::SinkMetrics;

/// Fixed-width, so lexicographic order of backup names is chronological
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H.%M.%S%.9f";

/// Sink that writes messages to a rotated log file
pub struct RotatingFileSink {
    name: String,
    base_path: PathBuf,
    max_files: i32,
    /// `None` while degraded
    file: Mutex<Option<BufWriter<File>>>,
    degraded_reported: AtomicBool,
    metrics: SinkMetrics,
}

impl RotatingFileSink {
    /// Open (and rotate) the log file
    ///
    /// Never fails: if the file cannot be opened the sink starts degraded and
    /// drops every message until a later [`rotate`](Self::rotate) succeeds.
    #[instrument(name = "rotating_file_sink_new", skip_all, fields(path = %params.base_path.display()))]
    pub fn new(name: impl Into<String>, params: RotatingFileParams) -> Self {
        let sink = Self {
            name: name.into(),
            base_path: params.base_path,
            max_files: params.max_files,
            file: Mutex::new(None),
            degraded_reported: AtomicBool::new(false),
            metrics: SinkMetrics::new(),
        };
        sink.rotate();
        sink
    }

    /// Create from params map (for factory)
    ///
    /// # Errors
    /// Only parameter parsing can fail; file problems degrade the sink instead.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        Ok(Self::new(name, RotatingFileParams::from_params(params)?))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_files(&self) -> i32 {
        self.max_files
    }

    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Whether the sink is currently dropping writes
    pub fn is_degraded(&self) -> bool {
        self.lock_file().is_none()
    }

    /// Close the current file, back it up, prune old backups, reopen
    ///
    /// Returns `false` when the sink ends up degraded.
    pub fn rotate(&self) -> bool {
        let mut file = self.lock_file();
        if let Some(mut current) = file.take() {
            let _ = current.flush();
        }

        match self.open() {
            Ok(writer) => {
                *file = Some(writer);
                self.degraded_reported.store(false, Ordering::Relaxed);
                debug!(sink = %self.name, path = %self.base_path.display(), "Log file opened");
                true
            }
            Err(e) => {
                warn!(
                    sink = %self.name,
                    path = %self.base_path.display(),
                    error = %e,
                    "Cannot open log file, dropping messages"
                );
                self.degraded_reported.store(true, Ordering::Relaxed);
                false
            }
        }
    }

    /// Retained backups, oldest first
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let Some(file_name) = self.base_path.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{file_name}.");

        let mut backups = Vec::new();
        for entry in fs::read_dir(self.parent_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let is_backup = name
                .strip_prefix(&prefix)
                .and_then(|suffix| suffix.chars().next())
                .is_some_and(|c| c.is_ascii_digit());
            if is_backup {
                backups.push(entry.path());
            }
        }
        backups.sort();
        Ok(backups)
    }

    fn open(&self) -> io::Result<BufWriter<File>> {
        fs::create_dir_all(self.parent_dir())?;

        let file = if self.max_files > 0 {
            if self.base_path.exists() {
                fs::rename(&self.base_path, self.backup_path())?;
                self.prune_backups();
            }
            File::create(&self.base_path)?
        } else {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.base_path)?
        };
        Ok(BufWriter::new(file))
    }

    fn parent_dir(&self) -> &Path {
        match self.base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn backup_path(&self) -> PathBuf {
        self.backup_path_at(&Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string())
    }

    /// First free backup name for `stamp`; collisions get a zero-padded suffix
    fn backup_path_at(&self, stamp: &str) -> PathBuf {
        let mut candidate = PathBuf::from(format!("{}.{stamp}", self.base_path.display()));
        let mut attempt = 1;
        while candidate.exists() {
            candidate = PathBuf::from(format!("{}.{stamp}-{attempt:04}", self.base_path.display()));
            attempt += 1;
        }
        candidate
    }

    /// Delete backups beyond `max_files`, oldest first
    ///
    /// Failures are reported and skipped; they never keep the sink from
    /// opening the fresh log file.
    fn prune_backups(&self) {
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!(sink = %self.name, error = %e, "Cannot list backups, skipping pruning");
                return;
            }
        };
        let keep = self.max_files.max(0) as usize;
        if backups.len() > keep {
            self.remove_backups(&backups[..backups.len() - keep]);
        }
    }

    /// Remove the given backups, returning how many were deleted
    fn remove_backups(&self, old: &[PathBuf]) -> u64 {
        let mut removed = 0;
        for backup in old {
            match fs::remove_file(backup) {
                Ok(()) => {
                    removed += 1;
                    debug!(sink = %self.name, backup = %backup.display(), "Old backup removed");
                }
                Err(e) => warn!(
                    sink = %self.name,
                    backup = %backup.display(),
                    error = %e,
                    "Cannot remove old backup"
                ),
            }
        }
        if removed > 0 {
            record_backups_pruned(&self.name, removed);
        }
        removed
    }

    fn lock_file(&self) -> MutexGuard<'_, Option<BufWriter<File>>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(writer: &mut BufWriter<File>, message: &str, is_error: bool) -> io::Result<()> {
        writer.write_all(message.as_bytes())?;
        // Errors are flushed right away; plain prints only on request
        if is_error || globals::flush_stdout_on_print() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl LogSink for RotatingFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, message: &str, is_error: bool) {
        if !self.should_log(is_error) {
            return;
        }

        let mut file = self.lock_file();
        let Some(writer) = file.as_mut() else {
            self.metrics.inc_dropped_count();
            record_sink_dropped(&self.name);
            return;
        };

        match Self::append(writer, message, is_error) {
            Ok(()) => {
                self.metrics.inc_write_count();
                record_sink_write(&self.name, true);
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                record_sink_write(&self.name, false);
                if !self.degraded_reported.swap(true, Ordering::Relaxed) {
                    warn!(sink = %self.name, error = %e, "Log file write failed");
                }
            }
        }
    }

    fn flush_output(&self) {
        if let Some(writer) = self.lock_file().as_mut() {
            let _ = writer.flush();
        }
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        self.flush_output();
    }
}
