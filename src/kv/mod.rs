//! Bounded-cache key-value engine
//!
//! The disk-backed cell store sits on top of this engine. Memory use is
//! capped by a byte budget: recent writes live in a sorted MemTable, and
//! once it reaches the budget it is written out as an immutable, sorted
//! SSTable. Reads consult the MemTable first, then SSTables newest → oldest.
//!
//! ```text
//!        put / delete                    get / scan_prefix
//!             │                                 │
//!             ▼                                 ▼
//!     ┌───────────────┐   budget hit    ┌───────────────┐
//!     │   MemTable    │ ──────────────► │   SSTables    │
//!     │ (BTreeMap)    │    spill        │ (newest first)│
//!     └───────────────┘                 └───────┬───────┘
//!                                               │ too many
//!                                               ▼
//!                                          compaction
//! ```
//!
//! Keys enumerate in lexicographic byte order in both tiers, which is what
//! row scans rely on.

mod engine;
mod manager;
mod memtable;
pub mod sstable;

pub use engine::Engine;
pub use manager::StorageManager;
pub use memtable::MemTable;

/// A value or a deletion marker, as held by either tier
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A live value
    Value(Vec<u8>),

    /// A tombstone (deleted key)
    Tombstone,
}

impl Entry {
    pub(crate) fn footprint(&self) -> usize {
        match self {
            Entry::Value(v) => v.len(),
            Entry::Tombstone => 0,
        }
    }
}
