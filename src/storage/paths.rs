// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the record store layout.

use std::path::{Path, PathBuf};

/// Default data directory when `DATA_DIR` is not set.
pub const DATA_ROOT: &str = "./data";

/// Well-known file holding the donation record array.
pub const DONATIONS_FILE: &str = "donations.json";

/// Well-known file holding administrative contact/donation notes.
pub const CONTACT_MESSAGES_FILE: &str = "contact_messages.json";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn donations_file(&self) -> PathBuf {
        self.root.join(DONATIONS_FILE)
    }

    pub fn contact_messages_file(&self) -> PathBuf {
        self.root.join(CONTACT_MESSAGES_FILE)
    }
}
