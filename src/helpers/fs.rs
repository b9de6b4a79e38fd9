//! File System Utilities
//!
//! Configuration, data and download directory management.

use crate::error::{Error, Result};
use directories::{ProjectDirs, UserDirs};
use std::fs;
use std::path::{Path, PathBuf};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "cluster", "cluster-console")
        .ok_or_else(|| Error::invalid("Could not determine project directories"))
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}

/// Get or create the application's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/cluster-console/` or `$XDG_CONFIG_HOME/cluster-console/`
/// - **macOS**: `~/Library/Application Support/com.cluster.cluster-console/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\cluster\cluster-console\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    ensure_dir(project_dirs()?.config_dir())
}

/// Get or create the data directory
pub fn get_or_create_data_dir() -> Result<PathBuf> {
    ensure_dir(project_dirs()?.data_dir())
}

/// Resolve the directory exported files are written to
///
/// An explicit directory wins; otherwise the user's download directory, and
/// the application data directory when the platform has none.
pub fn get_or_create_download_dir(preferred: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = preferred {
        return ensure_dir(dir);
    }

    match UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)) {
        Some(dir) => ensure_dir(&dir),
        None => get_or_create_data_dir(),
    }
}
