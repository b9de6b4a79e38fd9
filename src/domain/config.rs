//! Config - Console Configuration
//!
//! Loaded from `console.toml` in the platform config directory. Every field
//! has a default so a missing or partial file still yields a usable config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::paginator::PagingMode;
use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_EXPORT_FILE_NAME, DEFAULT_PAGE_SIZE, EXPORT_MIN_PAGE_SIZE,
};
use crate::error::{Error, Result};
use crate::helpers::get_or_create_config_dir;

/// Main console configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Listing defaults
    pub listing: ListingConfig,
    /// CSV export settings
    pub export: ExportConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Listing defaults applied to every new controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Rows per page
    pub page_size: u32,
    /// Paging mode
    pub paging_mode: PagingMode,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            paging_mode: PagingMode::Offset,
        }
    }
}

/// CSV export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name of the generated CSV
    pub file_name: String,
    /// Lower bound for the page size of a synthesized full-export request
    pub min_page_size: u32,
    /// Target directory; falls back to the user's download directory
    pub directory: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            min_page_size: EXPORT_MIN_PAGE_SIZE,
            directory: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Directory for a daily rolling log file; stdout only when absent
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl ConsoleConfig {
    /// Check invariants the rest of the crate relies on
    pub fn validate(&self) -> Result<()> {
        if self.listing.page_size == 0 {
            return Err(Error::invalid("listing.page_size must be positive"));
        }
        if self.export.file_name.trim().is_empty() {
            return Err(Error::invalid("export.file_name must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ConsoleConfig = if content.trim().is_empty() {
            ConsoleConfig::default()
        } else {
            toml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(get_or_create_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file, defaults when it does not exist
pub fn load_config_from(path: &Path) -> Result<ConsoleConfig> {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(ConsoleConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    ConsoleConfig::from_toml(&content)
}

/// Load configuration from the platform config directory
pub fn load_config() -> Result<ConsoleConfig> {
    let path = config_path()?;

    #[cfg(debug_assertions)]
    info!("Console config file: {}", path.display());

    load_config_from(&path)
}

/// Save configuration to a file
pub async fn save_config_to(path: &Path, config: &ConsoleConfig) -> Result<()> {
    config.validate()?;
    let content = toml::to_string_pretty(config)?;
    smol::fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ConsoleConfig::from_toml(
            r#"
            [listing]
            paging_mode = "open_ended"
            "#,
        )
        .expect("parse");

        assert_eq!(config.listing.paging_mode, PagingMode::OpenEnded);
        assert_eq!(config.listing.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.export.min_page_size, EXPORT_MIN_PAGE_SIZE);
        assert_eq!(config.export.file_name, "export.csv");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = ConsoleConfig::from_toml("   ").expect("parse");
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = ConsoleConfig::from_toml("[listing]\npage_size = 0\n");
        assert!(matches!(result, Err(Error::Invalid { .. })));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = ConsoleConfig::default();
        config.listing.page_size = 50;
        config.listing.paging_mode = PagingMode::Cursor;

        smol::block_on(save_config_to(&path, &config)).expect("save");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded, config);
    }
}
