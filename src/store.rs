use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use crate::model::ResponseRow;

/// Column order of the response table. `ResponseRow`'s serde field names
/// produce exactly this header.
pub const RESPONSE_COLUMNS: [&str; 11] = [
    "timestamp",
    "contact_name",
    "contact_email",
    "contact_phone",
    "attending",
    "guest_name",
    "starter_choice",
    "main_choice",
    "dessert_choice",
    "dietary_requirements",
    "comments",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write response table {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },
    #[error("flush response table {path}: {source}")]
    Flush { path: PathBuf, source: io::Error },
    #[error("create storage directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Flat-file accessor for the response table. Loads the whole table on
/// demand and appends by rewriting the file. Appends are serialized within
/// this process; writers in other processes sharing the file are not
/// coordinated with.
#[derive(Debug)]
pub struct RsvpStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RsvpStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every stored row. A missing file means no data yet; an
    /// unreadable or malformed file is logged and also treated as empty so
    /// the pages keep working (the raw file stays on disk for the operator).
    pub fn load_all(&self) -> Vec<ResponseRow> {
        match self.try_load() {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "response table unreadable, treating as empty"
                );
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<ResponseRow>, csv::Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    /// Appends `rows` as one batch: reads the current table, concatenates,
    /// and rewrites the whole file with the fixed header.
    pub fn append_rows(&self, rows: &[ResponseRow]) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;

        let mut all = self.load_all();
        all.extend(rows.iter().cloned());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        for row in &all {
            writer.serialize(row).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        writer.flush().map_err(|source| StoreError::Flush {
            path: self.path.clone(),
            source,
        })
    }
}
