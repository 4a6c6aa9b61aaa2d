//! Configuration for cellstore
//!
//! Centralized configuration with sensible defaults. A `Config` is threaded
//! into backend construction explicitly; there is no process-wide mutable
//! state.

use std::path::PathBuf;

use crate::error::{CellStoreError, Result};

/// Default cache budget for one disk-backed sheet: 1 MiB
pub const DEFAULT_CACHE_SIZE_BYTES: usize = 1024 * 1024;

/// Main configuration for cell storage backends
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Disk Backend Configuration
    // -------------------------------------------------------------------------
    /// Max bytes held in memory by one disk-backed store before its
    /// memtable spills to an SSTable. Independent of the number of cells.
    pub cache_size_bytes: usize,

    /// Directory under which each disk-backed store creates its own
    /// temporary directory:
    ///   {temp_root}/
    ///     └── {dir_prefix}XXXXXX/
    ///           └── sstables/
    pub temp_root: PathBuf,

    /// Name prefix for per-store temporary directories
    pub dir_prefix: String,

    // -------------------------------------------------------------------------
    // KV Engine Configuration
    // -------------------------------------------------------------------------
    /// Number of SSTables that triggers a full compaction
    pub max_sstables: usize,

    /// Verify the data CRC of every SSTable when it is opened
    pub verify_checksums: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
            temp_root: std::env::temp_dir(),
            dir_prefix: "cellstore-".to_string(),
            max_sstables: 8,
            verify_checksums: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can drive a backend
    pub fn validate(&self) -> Result<()> {
        if self.cache_size_bytes == 0 {
            return Err(CellStoreError::Config(
                "cache_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_sstables < 2 {
            return Err(CellStoreError::Config(format!(
                "max_sstables must be at least 2, got {}",
                self.max_sstables
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the cache budget (in bytes) for each disk-backed store
    pub fn cache_size_bytes(mut self, size: usize) -> Self {
        self.config.cache_size_bytes = size;
        self
    }

    /// Set the cache budget in KiB, failing if the byte count overflows
    pub fn cache_size_kib(self, kib: usize) -> Result<Self> {
        let bytes = kib.checked_mul(1024).ok_or_else(|| {
            CellStoreError::Config(format!("cache size of {} KiB overflows usize bytes", kib))
        })?;
        Ok(self.cache_size_bytes(bytes))
    }

    /// Set the directory under which temporary store directories are created
    pub fn temp_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.temp_root = path.into();
        self
    }

    /// Set the temporary directory name prefix
    pub fn dir_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.dir_prefix = prefix.into();
        self
    }

    /// Set the SSTable count that triggers compaction
    pub fn max_sstables(mut self, count: usize) -> Self {
        self.config.max_sstables = count;
        self
    }

    /// Enable or disable SSTable checksum verification on open
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.config.verify_checksums = verify;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
