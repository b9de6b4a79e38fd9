//! Listing Constants
//!
//! Centralized defaults shared by the listing state, controller and export.

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Smallest page size used when synthesizing an "export everything" request
pub const EXPORT_MIN_PAGE_SIZE: u32 = 10_000;

/// Default CSV file name
pub const DEFAULT_EXPORT_FILE_NAME: &str = "export.csv";

/// Column holding the interactive session launcher; never exported
pub const CONNECT_SESSION_COLUMN_ID: &str = "connect-session";

/// Configuration file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "console.toml";

/// Log file prefix for the rolling file appender
pub const LOG_FILE_PREFIX: &str = "cluster-console.log";
