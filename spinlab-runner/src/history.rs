//! Spin history: JSONL append-only persistence of recorded outcomes.
//!
//! Each line is one `{number, recorded_at}` object. Line order is spin order,
//! so replaying the file rebuilds the full `OutcomeSequence`. Blank lines are
//! ignored. Any other line that does not decode to a valid record (bad JSON,
//! a number outside 0-36) fails the read with its line number: dropping it
//! would shift every later spin.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use spinlab_core::{Outcome, OutcomeSequence};

/// Errors from reading or writing the history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt history {path} at line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize spin record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One recorded spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub number: Outcome,
    pub recorded_at: DateTime<Utc>,
}

/// JSONL spin log.
#[derive(Debug, Clone)]
pub struct SpinHistory {
    path: PathBuf,
}

impl SpinHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one outcome stamped with the current time.
    pub fn append(&self, number: Outcome) -> Result<SpinRecord, HistoryError> {
        let record = SpinRecord {
            number,
            recorded_at: Utc::now(),
        };
        self.append_records(std::slice::from_ref(&record))?;
        Ok(record)
    }

    /// Append several outcomes, in order, sharing one timestamp.
    pub fn append_many(&self, numbers: &[Outcome]) -> Result<usize, HistoryError> {
        let now = Utc::now();
        let records: Vec<SpinRecord> = numbers
            .iter()
            .map(|&number| SpinRecord {
                number,
                recorded_at: now,
            })
            .collect();
        self.append_records(&records)?;
        Ok(records.len())
    }

    /// Append pre-stamped records.
    pub fn append_records(&self, records: &[SpinRecord]) -> Result<(), HistoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut lines = String::new();
        for record in records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(lines.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), appended = records.len(), "appended spins");
        Ok(())
    }

    /// Read every record, oldest first. A missing file is an empty history.
    pub fn read_all(&self) -> Result<Vec<SpinRecord>, HistoryError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = Vec::new();
        for (idx, line) in io::BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str::<SpinRecord>(&line).map_err(|source| {
                HistoryError::Corrupt {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                }
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// The full recorded history, oldest first.
    pub fn replay(&self) -> Result<OutcomeSequence, HistoryError> {
        Ok(self.read_all()?.into_iter().map(|r| r.number).collect())
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        Ok(self.read_all()?.len())
    }

    /// Delete every record. Clearing a missing file is not an error.
    pub fn clear(&self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
