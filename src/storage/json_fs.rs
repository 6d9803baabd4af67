// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON file operations backing the record store.
//!
//! Each collection is a single JSON array in one file. Writes go through a
//! temporary file followed by a rename so a crash mid-write never leaves a
//! truncated array behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::repository::StatusTransitionError;
use super::StoragePaths;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage not initialized")]
    NotInitialized,

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    InvalidTransition(#[from] StatusTransitionError),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// File-backed JSON storage rooted at the data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    paths: StoragePaths,
    initialized: bool,
}

impl JsonStorage {
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create the data directory. Safe to call multiple times.
    pub fn initialize(&mut self) -> StorageResult<()> {
        fs::create_dir_all(self.paths.root())?;
        self.initialized = true;
        Ok(())
    }

    /// Write-read-delete probe of the data directory.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";
        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "health check data mismatch",
            )));
        }
        Ok(())
    }

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
            _ => StorageError::Io(e),
        })?;
        let value = serde_json::from_reader(BufReader::new(file))?;
        Ok(value)
    }

    /// Read a JSON file, treating a missing file as `T::default()`.
    pub fn read_json_or_default<T: DeserializeOwned + Default>(
        &self,
        path: impl AsRef<Path>,
    ) -> StorageResult<T> {
        match self.read_json(path) {
            Err(StorageError::NotFound(_)) => Ok(T::default()),
            other => other,
        }
    }

    /// Write a JSON file (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        File::open(path.as_ref()).is_ok()
    }
}
