//! # File Snapshot Store
//!
//! Format: `[MAGIC (7)][VERSION (1)][bincode(StoreSnapshot)]`.
//!
//! Writes go to a temporary file that is fsynced and renamed over the
//! previous snapshot, so a crash leaves either the old or the new file.
//! The data directory is held with an exclusive `fs2` lock for the lifetime
//! of the store so two nodes never share one directory.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{PersistenceError, StoreSnapshot};
use crate::ports::SnapshotStore;

const SNAPSHOT_MAGIC: &[u8; 7] = b"GSSTORE";
const SNAPSHOT_VERSION: u8 = 1;

const SNAPSHOT_FILE: &str = "store.snapshot";
const TEMP_FILE: &str = "store.snapshot.tmp";
const LOCK_FILE: &str = "LOCK";

#[derive(Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
    /// Held open to keep the directory lock.
    _lock: File,
}

impl FileSnapshotStore {
    /// Open (creating if needed) `dir` and lock it.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Locked` if another process holds the directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let lock_path = dir.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock.try_lock_exclusive()
            .map_err(|_| PersistenceError::Locked { path: lock_path })?;

        info!(dir = %dir.display(), "Snapshot directory opened");
        Ok(Self { dir, _lock: lock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn encode(snapshot: &StoreSnapshot) -> Result<Vec<u8>, PersistenceError> {
        let body = bincode::serialize(snapshot)?;
        let mut buf = Vec::with_capacity(SNAPSHOT_MAGIC.len() + 1 + body.len());
        buf.extend_from_slice(SNAPSHOT_MAGIC);
        buf.push(SNAPSHOT_VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    fn decode(data: &[u8]) -> Result<StoreSnapshot, PersistenceError> {
        let header = SNAPSHOT_MAGIC.len() + 1;
        if data.len() < header || &data[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
            return Err(PersistenceError::InvalidMagic);
        }
        let version = data[SNAPSHOT_MAGIC.len()];
        if version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(version));
        }
        Ok(bincode::deserialize(&data[header..])?)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load_snapshot(&self) -> Result<Option<StoreSnapshot>, PersistenceError> {
        let path = self.snapshot_path();
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let snapshot = Self::decode(&data)?;
        debug!(
            entries = snapshot.entries.len(),
            epoch = snapshot.epoch,
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    fn save_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError> {
        let data = Self::encode(snapshot)?;
        let temp_path = self.dir.join(TEMP_FILE);

        {
            let mut temp = File::create(&temp_path)?;
            temp.write_all(&data)?;
            temp.sync_all()?;
        }
        fs::rename(&temp_path, self.snapshot_path())?;

        debug!(
            entries = snapshot.entries.len(),
            bytes = data.len(),
            epoch = snapshot.epoch,
            "Snapshot written"
        );
        Ok(())
    }
}
