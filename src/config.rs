//! Store configuration.
//!
//! Values resolve in the order builder setting, environment variable, default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TagError};

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "TAGSPACE_DB_PATH";
/// Environment variable for the SQLite busy timeout in milliseconds.
pub const BUSY_TIMEOUT_ENV: &str = "TAGSPACE_BUSY_TIMEOUT_MS";
/// Environment variable for the number of rows fetched per search page.
pub const SEARCH_PAGE_SIZE_ENV: &str = "TAGSPACE_SEARCH_PAGE_SIZE";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SEARCH_PAGE_SIZE: usize = 100;

/// Resolved configuration for opening a tag store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Rows fetched per round trip by lazy searches.
    pub search_page_size: usize,
    /// Use the WAL journal so readers never block on the writer.
    pub wal: bool,
}

impl StoreConfig {
    /// Starts a builder.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::new()
    }

    /// Loads `.env` if present, then resolves every value from the environment.
    ///
    /// # Errors
    ///
    /// Returns `TagError::Config` for unparseable variables or when no data
    /// directory can be determined for the default path.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        StoreConfigBuilder::new().build()
    }
}

/// Builder for [`StoreConfig`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tagspace::StoreConfig;
///
/// let config = StoreConfig::builder()
///     .path("/tmp/tags.db")
///     .busy_timeout(Duration::from_millis(250))
///     .search_page_size(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.search_page_size, 10);
/// assert!(config.wal);
/// ```
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    path: Option<PathBuf>,
    busy_timeout: Option<Duration>,
    search_page_size: Option<usize>,
    wal: Option<bool>,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    pub fn search_page_size(mut self, size: usize) -> Self {
        self.search_page_size = Some(size);
        self
    }

    pub fn wal(mut self, enabled: bool) -> Self {
        self.wal = Some(enabled);
        self
    }

    /// Resolves the configuration.
    ///
    /// # Environment Variables
    ///
    /// - `TAGSPACE_DB_PATH` (default `{data_dir}/tagspace/tags.db`)
    /// - `TAGSPACE_BUSY_TIMEOUT_MS` (default 5000)
    /// - `TAGSPACE_SEARCH_PAGE_SIZE` (default 100, must be positive)
    pub fn build(self) -> Result<StoreConfig> {
        let path = match self.path {
            Some(path) => path,
            None => match std::env::var(DB_PATH_ENV) {
                Ok(path) => PathBuf::from(path),
                Err(_) => default_database_path()?,
            },
        };

        let busy_timeout = match self.busy_timeout {
            Some(timeout) => timeout,
            None => Duration::from_millis(
                env_number(BUSY_TIMEOUT_ENV)?.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
            ),
        };

        let search_page_size = match self.search_page_size {
            Some(size) => size,
            None => env_number(SEARCH_PAGE_SIZE_ENV)?.unwrap_or(DEFAULT_SEARCH_PAGE_SIZE),
        };
        if search_page_size == 0 {
            return Err(TagError::Config(
                "search page size must be greater than zero".to_string(),
            ));
        }

        Ok(StoreConfig {
            path,
            busy_timeout,
            search_page_size,
            wal: self.wal.unwrap_or(true),
        })
    }
}

fn env_number<T: std::str::FromStr>(var: &str) -> Result<Option<T>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| TagError::Config(format!("{var} is not a valid number: {raw:?}"))),
        Err(_) => Ok(None),
    }
}

/// Gets the cross-platform default database path.
///
/// Returns `{data_dir}/tagspace/tags.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
pub fn default_database_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| TagError::Config("failed to determine data directory".to_string()))?;

    Ok(data_dir.join("tagspace").join("tags.db"))
}

/// Ensures the parent directory of the database file exists.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
