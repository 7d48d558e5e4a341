//! Transcript files on disk.
//!
//! Transcripts are written as `<timestamp>.<title>.md` into a single log
//! directory. The timestamp format is fixed width so that lexical order of
//! file names matches chronological order.

use chrono::{DateTime, TimeZone};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::core::config::data::path_display;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d--%H-%M-%S-%z";

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn log_file_name(timestamp: &str, title: &str) -> String {
    format!("{timestamp}.{title}.md")
}

#[derive(Debug)]
pub enum LogStoreError {
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for LogStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStoreError::CreateDir { path, source } => write!(
                f,
                "Could not create log directory {}: {}",
                path_display(path),
                source
            ),
            LogStoreError::Write { path, source } => {
                write!(f, "Could not write log file {}: {}", path_display(path), source)
            }
            LogStoreError::Scan { path, source } => {
                write!(f, "Could not scan {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for LogStoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            LogStoreError::CreateDir { source, .. }
            | LogStoreError::Write { source, .. }
            | LogStoreError::Scan { source, .. } => Some(source),
        }
    }
}

pub struct LogStore {
    dir: PathBuf,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a transcript and return the path of the new file.
    pub fn write(
        &self,
        timestamp: &str,
        title: &str,
        content: &str,
    ) -> Result<PathBuf, LogStoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| LogStoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(log_file_name(timestamp, title));
        fs::write(&path, content).map_err(|source| LogStoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "transcript written");
        Ok(path)
    }

    /// Most recently modified file anywhere under the log directory.
    ///
    /// A missing directory counts as empty. Ties on modification time go to
    /// the lexically greater path.
    pub fn find_latest(&self) -> Result<Option<PathBuf>, LogStoreError> {
        if !self.dir.exists() {
            return Ok(None);
        }

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        let mut pending = vec![self.dir.clone()];

        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir).map_err(|source| LogStoreError::Scan {
                path: dir.clone(),
                source,
            })?;

            for entry in entries {
                let entry = entry.map_err(|source| LogStoreError::Scan {
                    path: dir.clone(),
                    source,
                })?;
                let path = entry.path();
                let metadata = entry.metadata().map_err(|source| LogStoreError::Scan {
                    path: path.clone(),
                    source,
                })?;

                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }

                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                let newer = match &latest {
                    None => true,
                    Some((best_time, best_path)) => {
                        modified > *best_time || (modified == *best_time && path > *best_path)
                    }
                };
                if newer {
                    latest = Some((modified, path));
                }
            }
        }

        Ok(latest.map(|(_, path)| path))
    }
}
