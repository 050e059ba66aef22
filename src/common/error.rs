use thiserror::Error;

use super::types::{FrameId, PageId};

/// Errors surfaced by the storage core.
///
/// Most public APIs (buffer pool, hash index) adapt this into a plain
/// `bool`/`Option` at their boundary; this richer enum is what the internal
/// fallible plumbing actually returns and what gets logged.
#[derive(Error, Debug)]
pub enum CrioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page {0} not found")]
    PageNotFound(PageId),

    #[error("Frame {0} not found")]
    FrameNotFound(FrameId),

    #[error("Buffer pool is full, no evictable frames available")]
    BufferPoolFull,

    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),

    #[error("Invalid frame ID: {0}")]
    InvalidFrameId(FrameId),

    #[error("Page {0} is still pinned")]
    PageStillPinned(PageId),

    #[error("Failed to evict page")]
    EvictionFailed,

    #[error("Disk scheduler error: {0}")]
    DiskScheduler(String),

    #[error("Page is full")]
    PageFull,

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Directory page is full")]
    DirectoryFull,

    #[error("Hash table has reached its maximum depth")]
    HashTableFull,

    #[error("Invalid database file")]
    InvalidDatabaseFile,

    #[error("Duplicate key")]
    DuplicateKey,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Index corrupted: {0}")]
    IndexCorrupted(String),
}

pub type Result<T> = std::result::Result<T, CrioError>;
