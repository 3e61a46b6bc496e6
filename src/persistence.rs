// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Snapshot persistence.
//!
//! A [`PersistenceGateway`] loads the whole [`Snapshot`] once at startup and
//! stores the whole snapshot after every mutation. Loading never fails: a
//! missing or unreadable snapshot is replaced by [`Snapshot::seed`].

use crate::error::PersistError;
use crate::snapshot::Snapshot;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Backing store for the bank snapshot.
pub trait PersistenceGateway: Send + Sync {
    /// Returns the stored snapshot, or the seed dataset when there is none.
    fn load(&self) -> Snapshot;

    /// Replaces the stored snapshot with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Arc<G> {
    fn load(&self) -> Snapshot {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        (**self).save(snapshot)
    }
}

/// Stores the snapshot as pretty-printed JSON in a single file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so readers see either the previous snapshot or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn read(&self) -> Result<Snapshot, PersistError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn reseed(&self) -> Snapshot {
        let seed = Snapshot::seed();
        if let Err(e) = self.save(&seed) {
            warn!(path = %self.path.display(), error = %e, "could not write seed snapshot");
        }
        seed
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn load(&self) -> Snapshot {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no snapshot found, seeding default data");
            return self.reseed();
        }

        match self.read() {
            Ok(snapshot) => {
                info!(
                    path = %self.path.display(),
                    users = snapshot.users.len(),
                    "loaded snapshot"
                );
                snapshot
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "snapshot unreadable, reseeding default data"
                );
                if let Err(e) = fs::copy(&self.path, self.corrupt_path()) {
                    warn!(error = %e, "could not keep a copy of the unreadable snapshot");
                }
                self.reseed()
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Keeps the snapshot in memory only.
///
/// Used where there is no file to write to, such as tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    stored: Mutex<Option<Snapshot>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `snapshot` already stored.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            stored: Mutex::new(Some(snapshot)),
        }
    }

    /// Last snapshot passed to [`PersistenceGateway::save`].
    pub fn stored(&self) -> Option<Snapshot> {
        self.stored.lock().clone()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Snapshot {
        self.stored.lock().get_or_insert_with(Snapshot::seed).clone()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        *self.stored.lock() = Some(snapshot.clone());
        Ok(())
    }
}
