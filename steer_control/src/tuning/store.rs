//! [`ParamStore`] implementations.
//!
//! - [`FileParamStore`]: one file per key under a directory; the file body
//!   is the value. Writers (a tuning UI, a shell) replace files in place;
//!   readers see whichever write landed last. Only regular files are read,
//!   and the open never blocks, so a FIFO or device under a key name cannot
//!   stall the control tick.
//! - [`MemoryParamStore`]: map-backed store for tests and simulation.
//! - [`ConfiguredStore`]: whichever of the two the config selects.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use super::{ParamStore, TuningError};

/// Longest value read from a param file [bytes].
const MAX_VALUE_LEN: u64 = 256;

/// Directory-backed key/value store.
#[derive(Debug, Clone)]
pub struct FileParamStore {
    root: PathBuf,
}

impl FileParamStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ParamStore for FileParamStore {
    fn get(&self, key: &str) -> Result<Option<String>, TuningError> {
        let store_err = |source| TuningError::Store {
            key: key.to_string(),
            source,
        };

        let file = match open_regular(&self.key_path(key)) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_err(e)),
        };

        // One byte past the limit tells a full-length value from a long one.
        let mut buf = Vec::new();
        file.take(MAX_VALUE_LEN + 1)
            .read_to_end(&mut buf)
            .map_err(store_err)?;
        if buf.len() as u64 > MAX_VALUE_LEN {
            return Err(TuningError::TooLong {
                key: key.to_string(),
                limit: MAX_VALUE_LEN,
            });
        }

        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| TuningError::Encoding {
                key: key.to_string(),
            })
    }
}

/// Open `path` for reading without blocking; anything but a regular file is
/// rejected before the first read.
fn open_regular(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)?;
    if !file.metadata()?.is_file() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    Ok(file)
}

/// In-memory key/value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryParamStore {
    values: HashMap<String, String>,
}

impl MemoryParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl ParamStore for MemoryParamStore {
    fn get(&self, key: &str) -> Result<Option<String>, TuningError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Store selected at startup.
#[derive(Debug, Clone)]
pub enum ConfiguredStore {
    File(FileParamStore),
    Memory(MemoryParamStore),
}

impl ParamStore for ConfiguredStore {
    fn get(&self, key: &str) -> Result<Option<String>, TuningError> {
        match self {
            Self::File(s) => s.get(key),
            Self::Memory(s) => s.get(key),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
