//! Storage Contract
//!
//! Every backend implements [`CellStore`]. A sheet picks its backend once,
//! at construction, through a [`CellStoreConstructor`].
//!
//! ## Backends
//! ```text
//!                ┌──────────────────────┐
//!                │   Row / Sheet        │
//!                │ (key derivation)     │
//!                └──────────┬───────────┘
//!                           │ dyn CellStore
//!            ┌──────────────┴──────────────┐
//!            ▼                             ▼
//!   ┌─────────────────┐          ┌──────────────────┐
//!   │ MemoryCellStore │          │  DiskCellStore   │
//!   │ (HashMap x2)    │          │  (kv::Engine in  │
//!   │                 │          │   a temp dir)    │
//!   └─────────────────┘          └──────────────────┘
//! ```
//!
//! ## Concurrency
//! Every method takes `&mut self`: a backend serves one logical caller at a
//! time and does no locking of its own. Share a backend across threads only
//! behind the caller's own lock.

mod disk;
mod memory;

use std::sync::Arc;

use crate::cell::Cell;
use crate::config::Config;
use crate::error::Result;
use crate::row::Row;

pub use disk::DiskCellStore;
pub use memory::MemoryCellStore;

/// Callback invoked once per visited cell; an `Err` stops the enumeration
/// and becomes its return value unchanged.
pub type CellVisitor<'a> = dyn FnMut(Cell) -> Result<()> + 'a;

/// Zero-argument factory for a ready-to-use backend
pub type CellStoreConstructor = Arc<dyn Fn() -> Result<Box<dyn CellStore>> + Send + Sync>;

/// Persistence contract shared by all backends
pub trait CellStore {
    /// Read the cell stored under `key`
    ///
    /// Returns [`CellStoreError::CellNotFound`](crate::CellStoreError::CellNotFound)
    /// when nothing was ever written there.
    fn read_cell(&mut self, key: &str) -> Result<Cell>;

    /// Persist `cell` under its own key, replacing any previous record
    fn write_cell(&mut self, cell: &Cell) -> Result<()>;

    /// Remove the cell stored under `key`; a missing key is not an error
    fn delete_cell(&mut self, key: &str) -> Result<()>;

    /// Visit every stored cell of `row` in ascending column order
    fn for_each_in_row(&mut self, row: &Row, visitor: &mut CellVisitor<'_>) -> Result<()>;

    /// Release everything the backend owns, including any backing files
    fn close(self: Box<Self>) -> Result<()>;
}

/// Which backend a sheet should use
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Memory,
    Disk,
}

impl BackendKind {
    /// Build a constructor for this backend using `config`
    pub fn constructor(self, config: Config) -> CellStoreConstructor {
        match self {
            BackendKind::Memory => Arc::new(|| Ok(Box::new(MemoryCellStore::new()) as Box<dyn CellStore>)),
            BackendKind::Disk => Arc::new(move || {
                let store = DiskCellStore::open(&config)?;
                Ok(Box::new(store) as Box<dyn CellStore>)
            }),
        }
    }

    /// Open one backend instance directly
    pub fn open(self, config: &Config) -> Result<Box<dyn CellStore>> {
        match self {
            BackendKind::Memory => Ok(Box::new(MemoryCellStore::new())),
            BackendKind::Disk => Ok(Box::new(DiskCellStore::open(config)?)),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = crate::CellStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "disk" => Ok(BackendKind::Disk),
            other => Err(crate::CellStoreError::Config(format!(
                "unknown backend {:?} (expected \"memory\" or \"disk\")",
                other
            ))),
        }
    }
}
