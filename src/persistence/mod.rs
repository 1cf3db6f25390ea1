//! JSON files on disk
//!
//! Features:
//! - Typed errors for missing, unreadable and corrupt files
//! - Backup rotation (tmp → save, old save → backup)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt data in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            PersistenceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// `name.ext` → `name.ext.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

pub fn backup_path(path: &Path) -> PathBuf {
    sibling(path, "bak")
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| PersistenceError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON without ever leaving a half-written file
///
/// The data goes to `<path>.tmp` first; an existing file is kept as
/// `<path>.bak` before the temp file is renamed into place.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }

    let tmp = sibling(path, "tmp");
    fs::write(&tmp, json).map_err(|e| PersistenceError::io(&tmp, e))?;

    if path.exists() {
        let backup = backup_path(path);
        fs::rename(path, &backup).map_err(|e| PersistenceError::io(&backup, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| PersistenceError::io(path, e))?;

    log::debug!("Wrote {}", path.display());
    Ok(())
}
