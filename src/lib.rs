//! Crio - a disk-oriented storage engine core in Rust
//!
//! This crate provides the building blocks of a disk-oriented storage engine:
//! a buffer pool sitting on top of a disk manager and scheduler, and an
//! on-disk extendible hash index built on that buffer pool. There is no
//! catalog, query planner, or execution engine here; this is the storage
//! substrate those layers would be built on.
//!
//! # Architecture
//!
//! - **Storage layer** (`storage`): disk I/O and on-disk page formats
//!   - `disk::DiskManager`: allocates, reads, and writes fixed-size pages on a single backing file
//!   - `disk::DiskScheduler`: single-worker-thread scheduler that serializes disk requests
//!   - `page`: typed byte-array views over the database header page and the three
//!     hash index page layouts (header, directory, bucket)
//!
//! - **Buffer pool** (`buffer`): in-memory page cache
//!   - `BufferPoolManager`: fetches pages from disk and caches them in memory, evicting via the replacer
//!   - `LruKReplacer`: LRU-K page replacement policy
//!   - `FrameHeader`: per-frame metadata and data storage
//!   - `ReadPageGuard`/`WritePageGuard`: RAII guards for thread-safe page access
//!
//! - **Index** (`index`): the on-disk extendible hash table
//!   - `ExtendibleHashTable`: header -> directory -> bucket hash index
//!   - `HashFunction`/`HashTableComparator`: pluggable key hashing and equality
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crio::buffer::BufferPoolManager;
//! use crio::storage::disk::DiskManager;
//! use crio::index::{DefaultComparator, DefaultHashFunction, ExtendibleHashTable};
//!
//! // Create a disk manager for a database file.
//! let disk_manager = Arc::new(DiskManager::new("test.db").unwrap());
//!
//! // Create a buffer pool with 100 frames and LRU-2 replacement.
//! let bpm = Arc::new(BufferPoolManager::new(100, 2, disk_manager));
//!
//! // Build a hash index over (i64, i64) pairs.
//! let table = ExtendibleHashTable::new(
//!     "demo".to_string(),
//!     bpm,
//!     Arc::new(DefaultComparator),
//!     Arc::new(DefaultHashFunction),
//!     9,
//!     9,
//!     4,
//! )
//! .unwrap();
//!
//! table.insert(1i64, 100i64).unwrap();
//! let mut out = Vec::new();
//! table.get(&1, &mut out).unwrap();
//! assert_eq!(out, vec![100]);
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used types at the crate root
pub use common::{CrioError, PageId, RecordId, Result, SlotId};
