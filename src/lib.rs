//! # cellstore
//!
//! Pluggable cell storage for spreadsheet documents:
//! - One storage contract ([`CellStore`]) for reading, writing, deleting and
//!   row-wise visiting of cells
//! - A memory-resident backend (fast, unbounded memory growth)
//! - A disk-backed backend (memory bounded by a byte budget, slower)
//! - A sortable key encoding so row scans come out in column order
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Sheet / Row / Cell                      │
//! │            (key derivation, row handle re-attach)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ dyn CellStore
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────────┐
//!   │   Memory    │          │      Disk       │
//!   │  (HashMap)  │          │ (value + style  │
//!   └─────────────┘          │  + validation)  │
//!                            └────────┬────────┘
//!                                     │
//!                                     ▼
//!                            ┌─────────────────┐
//!                            │   kv::Engine    │
//!                            │ MemTable → SST  │
//!                            └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cellstore::{BackendKind, Config, Sheet};
//!
//! # fn main() -> cellstore::Result<()> {
//! let constructor = BackendKind::Disk.constructor(Config::default());
//! let mut sheet = Sheet::new("Sheet1", &constructor)?;
//!
//! let mut cell = sheet.add_cell(0)?;
//! cell.set_string("A cell!");
//! sheet.write_cell(&cell)?;
//!
//! sheet.for_each_in_row(0, |cell| {
//!     println!("{} = {}", cell.key(), cell.value());
//!     Ok(())
//! })?;
//! sheet.close()
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod style;
pub mod validation;
pub mod cell;
pub mod row;
pub mod sheet;
pub mod kv;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use cell::{Cell, CellKind, RowHandle};
pub use config::Config;
pub use error::{CellStoreError, Result};
pub use row::Row;
pub use sheet::Sheet;
pub use store::{
    BackendKind, CellStore, CellStoreConstructor, CellVisitor, DiskCellStore, MemoryCellStore,
};
pub use style::{Border, BorderStyle, Style};
pub use validation::DataValidation;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cellstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
