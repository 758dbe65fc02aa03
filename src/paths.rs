//! Cross-platform application paths

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// `<OS data dir>/voxarcade`, created if missing.
    pub fn new() -> io::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine data directory")
        })?;
        Self::at(base.join("voxarcade"))
    }

    /// Use an explicit directory (tests, portable installs).
    pub fn at(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn storage_file(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}
