use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{CrioError, PageId, Result, PAGE_SIZE};
use crate::storage::page::{DbHeaderPage, DbHeaderPageRef};

/// Slot within the backing file reserved for the database header. Slot 0 is
/// never handed out by `allocate_page`.
const HEADER_SLOT: u64 = 0;

/// DiskManager persists fixed-size pages to a single backing file.
///
/// A page ID maps directly to its file slot (`slot = page_id + 1`, slot 0
/// reserved for the header), the same identity scheme the file format
/// itself is built around: no in-memory table stands between a page ID and
/// where its bytes live, so a page written and flushed is readable by any
/// later `DiskManager` opened on the same file, including after a process
/// restart. The page-ID allocation counter is persisted into the header
/// page for the same reason — a reopened database must not hand out a page
/// ID whose slot already holds another page's data. Reads of a page that
/// was allocated but never written return a zero-filled buffer (the file
/// region backing it was never extended past, or was zeroed by `set_len`
/// when the file grew).
pub struct DiskManager {
    db_path: PathBuf,
    inner: Mutex<Inner>,
    next_page_id: AtomicI32,
    num_reads: AtomicU64,
    num_writes: AtomicU64,
}

struct Inner {
    file: File,
    /// Current file capacity, in slots.
    capacity_slots: u64,
}

impl DiskManager {
    /// Opens (or creates) the database file at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let is_new = !db_path.exists();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&db_path)?;

        let file_len = file.metadata()?.len();
        let mut capacity_slots = (file_len / PAGE_SIZE as u64).max(1);
        let next_page_id;

        if is_new {
            Self::grow_file(&mut file, capacity_slots)?;
            let mut data = [0u8; PAGE_SIZE];
            {
                let mut header = DbHeaderPage::new(&mut data);
                header.init();
            }
            file.seek(SeekFrom::Start(HEADER_SLOT * PAGE_SIZE as u64))?;
            file.write_all(&data)?;
            file.flush()?;
            next_page_id = 0;
            log::debug!("initialized new database file at {}", db_path.display());
        } else {
            let mut data = [0u8; PAGE_SIZE];
            file.seek(SeekFrom::Start(HEADER_SLOT * PAGE_SIZE as u64))?;
            if file.read_exact(&mut data).is_ok() {
                let header = DbHeaderPageRef::new(&data);
                if !header.is_valid() {
                    return Err(CrioError::InvalidDatabaseFile);
                }
                next_page_id = header.next_page_id();
            } else {
                return Err(CrioError::InvalidDatabaseFile);
            }
        }

        if capacity_slots < 1 {
            capacity_slots = 1;
        }

        let inner = Inner {
            file,
            capacity_slots,
        };

        Ok(Self {
            db_path,
            inner: Mutex::new(inner),
            next_page_id: AtomicI32::new(next_page_id),
            num_reads: AtomicU64::new(0),
            num_writes: AtomicU64::new(0),
        })
    }

    /// The file slot a page ID always lives at: identity-mapped, with slot
    /// 0 reserved for the header so page IDs start at slot 1.
    fn slot_for(page_id: PageId) -> u64 {
        debug_assert!(page_id.as_i32() >= 0, "page id must be non-negative");
        page_id.as_i32() as u64 + HEADER_SLOT + 1
    }

    /// Assigns a fresh, never-before-used page ID. No disk space is touched
    /// until the page is first written; the counter is persisted into the
    /// header page immediately so a reopened database never reissues an ID
    /// whose slot already holds data.
    pub fn allocate_page(&self) -> Result<PageId> {
        let id = self.next_page_id.fetch_add(1, Ordering::SeqCst);
        let page_id = PageId::new(id);

        let mut inner = self.inner.lock();
        self.persist_next_page_id(&mut inner, id + 1)?;

        Ok(page_id)
    }

    /// Zeroes the page's slot on disk. The page ID itself is never reused,
    /// so the slot is not returned to any free list; it simply reads back
    /// as zero from then on, including after a reopen.
    pub fn deallocate_page(&self, page_id: PageId) -> Result<()> {
        let slot = Self::slot_for(page_id);
        let mut inner = self.inner.lock();

        if slot < inner.capacity_slots {
            let byte_offset = slot * PAGE_SIZE as u64;
            inner.file.seek(SeekFrom::Start(byte_offset))?;
            inner.file.write_all(&[0u8; PAGE_SIZE])?;
            inner.file.flush()?;
        }

        Ok(())
    }

    /// Reads a page into `data`. Pages that were allocated but never written
    /// read back as all zeros rather than erroring.
    pub fn read_page(&self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE, "buffer must be PAGE_SIZE bytes");

        let slot = Self::slot_for(page_id);
        let mut inner = self.inner.lock();

        let byte_offset = slot * PAGE_SIZE as u64;
        inner.file.seek(SeekFrom::Start(byte_offset))?;
        let bytes_read = inner.file.read(data)?;
        if bytes_read < PAGE_SIZE {
            data[bytes_read..].fill(0);
        }

        self.num_reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Writes `data` for `page_id`, growing the file if the page's slot
    /// falls past the current capacity.
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        assert_eq!(data.len(), PAGE_SIZE, "buffer must be PAGE_SIZE bytes");

        let slot = Self::slot_for(page_id);
        let mut inner = self.inner.lock();
        self.ensure_capacity(&mut inner, slot + 1)?;

        let byte_offset = slot * PAGE_SIZE as u64;
        inner.file.seek(SeekFrom::Start(byte_offset))?;
        inner.file.write_all(data)?;
        inner.file.flush()?;

        self.num_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Stamps the page-ID allocation counter into the header slot.
    fn persist_next_page_id(&self, inner: &mut Inner, next_page_id: i32) -> Result<()> {
        let mut data = [0u8; PAGE_SIZE];
        {
            let mut header = DbHeaderPage::new(&mut data);
            header.init();
            header.set_next_page_id(next_page_id);
        }
        inner
            .file
            .seek(SeekFrom::Start(HEADER_SLOT * PAGE_SIZE as u64))?;
        inner.file.write_all(&data)?;
        inner.file.flush()?;
        Ok(())
    }

    /// Doubles the file's slot capacity until it can hold `required_slots`.
    fn ensure_capacity(&self, inner: &mut Inner, required_slots: u64) -> Result<()> {
        if required_slots <= inner.capacity_slots {
            return Ok(());
        }

        let mut new_capacity = inner.capacity_slots.max(1);
        while new_capacity < required_slots {
            new_capacity *= 2;
        }

        Self::grow_file(&mut inner.file, new_capacity)?;
        inner.capacity_slots = new_capacity;
        log::debug!(
            "grew database file {} to {} slots",
            self.db_path.display(),
            new_capacity
        );
        Ok(())
    }

    fn grow_file(file: &mut File, capacity_slots: u64) -> Result<()> {
        file.set_len(capacity_slots * PAGE_SIZE as u64)?;
        Ok(())
    }

    pub fn get_num_reads(&self) -> u64 {
        self.num_reads.load(Ordering::Relaxed)
    }

    pub fn get_num_writes(&self) -> u64 {
        self.num_writes.load(Ordering::Relaxed)
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn sync(&self) -> Result<()> {
        let inner = self.inner.lock();
        inner.file.sync_all()?;
        Ok(())
    }
}

impl Drop for DiskManager {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Err(e) = inner.file.sync_all() {
            log::warn!("failed to sync database file on drop: {e}");
        }
    }
}
