//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. Binaries read the
//! environment and hand the raw values to the parsing helpers below.

use crate::constants::DEFAULT_BOOKING_DATA_DIR;
use crate::{BookingError, BookingResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which [`BookingStore`](crate::store::BookingStore) implementation to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// YAML records in sharded directories under the data directory.
    #[default]
    File,
    /// Process-local maps; everything is lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(BookingError::InvalidInput(format!(
                "unknown store backend '{}' (expected 'file' or 'memory')",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::File => f.write_str("file"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    store_backend: StoreBackend,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` if `data_dir` is empty.
    pub fn new(data_dir: PathBuf, store_backend: StoreBackend) -> BookingResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(BookingError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            data_dir,
            store_backend,
        })
    }

    /// Build a configuration from optional raw environment values.
    ///
    /// Missing or blank values fall back to [`DEFAULT_BOOKING_DATA_DIR`] and
    /// [`StoreBackend::File`].
    pub fn from_env_values(
        data_dir: Option<String>,
        store_backend: Option<String>,
    ) -> BookingResult<Self> {
        let data_dir = data_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BOOKING_DATA_DIR.into());

        Self::new(
            PathBuf::from(data_dir),
            store_backend_from_env_value(store_backend)?,
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default backend.
pub fn store_backend_from_env_value(value: Option<String>) -> BookingResult<StoreBackend> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<StoreBackend>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}
