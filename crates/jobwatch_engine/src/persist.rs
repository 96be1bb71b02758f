use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jobwatch_logging::{watch_info, watch_warn};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_STATE_FILE: &str = "processed_jobs.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("failed to serialize links: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory holding the state file exists; create if missing.
pub fn ensure_state_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StateDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    }
    Ok(())
}

/// Replaces a file by writing a sibling temp file and renaming it over the target.
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    pub fn write(&self, content: &str) -> Result<(), PersistError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_state_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.target).map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }
}

/// Durable list of processed links.
pub trait LinkStore: Send + Sync {
    /// Previously saved links; empty when nothing usable is stored.
    fn load(&self) -> Vec<String>;
    /// Replaces the stored list with `links`.
    fn save(&self, links: &[String]) -> Result<(), PersistError>;
}

/// Stores links as a pretty-printed JSON array of strings.
#[derive(Debug, Clone)]
pub struct JsonLinkStore {
    path: PathBuf,
}

impl JsonLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LinkStore for JsonLinkStore {
    fn load(&self) -> Vec<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                watch_info!("No state file at {:?}; starting fresh", self.path);
                return Vec::new();
            }
            Err(err) => {
                watch_warn!("Failed to read state file {:?}: {}", self.path, err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(links) => links,
            Err(err) => {
                watch_warn!("Failed to parse state file {:?}: {}", self.path, err);
                Vec::new()
            }
        }
    }

    fn save(&self, links: &[String]) -> Result<(), PersistError> {
        let mut content = serde_json::to_string_pretty(links)?;
        content.push('\n');
        AtomicFileWriter::new(self.path.clone()).write(&content)
    }
}
