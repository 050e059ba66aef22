use std::collections::{HashMap, LinkedList};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{AccessClass, CrioError, FrameId, PageId, Result, INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::disk::{DiskManager, DiskScheduler};

use super::{FrameHeader, LruKReplacer, ReadPageGuard, WritePageGuard};

struct BufferPoolState {
    frames: Vec<Arc<FrameHeader>>,
    page_table: Mutex<HashMap<PageId, FrameId>>,
    free_list: Mutex<LinkedList<FrameId>>,
    replacer: LruKReplacer,
}

/// BufferPoolManager fetches database pages from disk and caches them in a
/// fixed number of in-memory frames, using LRU-K to choose eviction victims
/// when every frame is occupied.
///
/// A page that is resident but unpinned is still cached; it only leaves the
/// pool when the replacer selects it as an eviction victim to make room for
/// a different page.
pub struct BufferPoolManager {
    pool_size: usize,
    state: Arc<BufferPoolState>,
    disk_scheduler: DiskScheduler,
}

impl BufferPoolManager {
    /// Creates a new BufferPoolManager with the given pool size, k value for
    /// LRU-K, and disk manager.
    pub fn new(pool_size: usize, k: usize, disk_manager: Arc<DiskManager>) -> Self {
        let mut frames = Vec::with_capacity(pool_size);
        let mut free_list = LinkedList::new();

        for i in 0..pool_size {
            let frame_id = FrameId::new(i as i32);
            frames.push(Arc::new(FrameHeader::new(frame_id)));
            free_list.push_back(frame_id);
        }

        let state = Arc::new(BufferPoolState {
            frames,
            page_table: Mutex::new(HashMap::new()),
            free_list: Mutex::new(free_list),
            replacer: LruKReplacer::new(k, pool_size),
        });

        Self {
            pool_size,
            state,
            disk_scheduler: DiskScheduler::new(disk_manager),
        }
    }

    /// Returns the number of frames in the pool.
    pub fn size(&self) -> usize {
        self.pool_size
    }

    /// Allocates a new page and returns its ID. The page starts out
    /// unpinned and evictable; callers obtain a pinning guard through
    /// [`checked_write_page`](Self::checked_write_page) or
    /// [`checked_read_page`](Self::checked_read_page).
    pub fn new_page(&self) -> Result<PageId> {
        let frame_id = self.get_free_frame()?;
        let frame = &self.state.frames[frame_id.as_usize()];

        let page_id = self.disk_scheduler.disk_manager().allocate_page()?;

        frame.reset();
        frame.set_page_id(page_id);

        self.state.page_table.lock().insert(page_id, frame_id);

        self.state.replacer.record_access(frame_id, AccessClass::Unknown);
        self.state.replacer.set_evictable(frame_id, true);

        Ok(page_id)
    }

    /// Deletes a page from the buffer pool and disk. Returns `false` if the
    /// page was not resident; fails if it is still pinned.
    pub fn delete_page(&self, page_id: PageId) -> Result<bool> {
        let mut page_table = self.state.page_table.lock();

        if let Some(frame_id) = page_table.remove(&page_id) {
            let frame = &self.state.frames[frame_id.as_usize()];

            if frame.pin_count() > 0 {
                page_table.insert(page_id, frame_id);
                return Err(CrioError::PageStillPinned(page_id));
            }

            frame.reset();
            self.state.replacer.set_evictable(frame_id, true);
            self.state.replacer.remove(frame_id)?;
            self.state.free_list.lock().push_back(frame_id);

            drop(page_table);

            self.disk_scheduler
                .disk_manager()
                .deallocate_page(page_id)?;

            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Fetches a page for shared read access, pinning it for the lifetime of
    /// the returned guard. Returns `None` if the pool cannot make room.
    pub fn checked_read_page(
        &self,
        page_id: PageId,
        class: AccessClass,
    ) -> Result<Option<ReadPageGuard>> {
        if page_id == INVALID_PAGE_ID {
            return Err(CrioError::InvalidPageId(page_id));
        }

        let frame_id = match self.fetch_page(page_id, class) {
            Ok(frame_id) => frame_id,
            Err(CrioError::BufferPoolFull) => return Ok(None),
            Err(e) => return Err(e),
        };
        let frame = Arc::clone(&self.state.frames[frame_id.as_usize()]);
        let state = Arc::clone(&self.state);

        let guard = unsafe { ReadPageGuard::new(page_id, frame, Self::release_callback(state)) };

        Ok(Some(guard))
    }

    /// Fetches a page for exclusive write access, pinning it for the
    /// lifetime of the returned guard. Returns `None` if the pool cannot
    /// make room.
    pub fn checked_write_page(
        &self,
        page_id: PageId,
        class: AccessClass,
    ) -> Result<Option<WritePageGuard>> {
        if page_id == INVALID_PAGE_ID {
            return Err(CrioError::InvalidPageId(page_id));
        }

        let frame_id = match self.fetch_page(page_id, class) {
            Ok(frame_id) => frame_id,
            Err(CrioError::BufferPoolFull) => return Ok(None),
            Err(e) => return Err(e),
        };
        let frame = Arc::clone(&self.state.frames[frame_id.as_usize()]);
        let state = Arc::clone(&self.state);

        let guard = unsafe { WritePageGuard::new(page_id, frame, Self::release_callback(state)) };

        Ok(Some(guard))
    }

    /// Like [`checked_read_page`](Self::checked_read_page), but panics
    /// instead of returning `None`. For call sites where an unavailable
    /// page indicates a programmer error rather than a condition to handle.
    pub fn read_page(&self, page_id: PageId, class: AccessClass) -> ReadPageGuard {
        self.checked_read_page(page_id, class)
            .expect("failed to fetch page")
            .expect("buffer pool has no frame available for read_page")
    }

    /// Panicking counterpart to
    /// [`checked_write_page`](Self::checked_write_page).
    pub fn write_page(&self, page_id: PageId, class: AccessClass) -> WritePageGuard {
        self.checked_write_page(page_id, class)
            .expect("failed to fetch page")
            .expect("buffer pool has no frame available for write_page")
    }

    fn release_callback(
        state: Arc<BufferPoolState>,
    ) -> Box<dyn FnOnce(PageId, bool) + Send + Sync> {
        Box::new(move |pid, is_dirty| {
            let pt = state.page_table.lock();
            if let Some(&fid) = pt.get(&pid) {
                let frm = &state.frames[fid.as_usize()];
                if is_dirty {
                    frm.set_dirty(true);
                }
                if let Some(0) = frm.unpin() {
                    state.replacer.set_evictable(fid, true);
                }
            }
        })
    }

    /// Flushes a specific page to disk if resident. Returns `false` if the
    /// page is not in the pool.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        if page_id == INVALID_PAGE_ID {
            return Err(CrioError::InvalidPageId(page_id));
        }

        let page_table = self.state.page_table.lock();

        if let Some(&frame_id) = page_table.get(&page_id) {
            let frame = &self.state.frames[frame_id.as_usize()];

            let mut data = [0u8; PAGE_SIZE];
            frame.copy_to(&mut data);

            self.disk_scheduler.schedule_write_sync(page_id, &data)?;
            frame.set_dirty(false);

            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Flushes every dirty resident page to disk.
    pub fn flush_all_pages(&self) -> Result<()> {
        let page_ids: Vec<PageId> = {
            let page_table = self.state.page_table.lock();
            page_table
                .iter()
                .filter(|(_, &frame_id)| self.state.frames[frame_id.as_usize()].is_dirty())
                .map(|(&pid, _)| pid)
                .collect()
        };

        for page_id in page_ids {
            self.flush_page(page_id)?;
        }

        Ok(())
    }

    /// Returns the pin count for a resident page, or `None` if it is not in
    /// the pool.
    pub fn get_pin_count(&self, page_id: PageId) -> Option<u32> {
        let page_table = self.state.page_table.lock();

        page_table
            .get(&page_id)
            .map(|&frame_id| self.state.frames[frame_id.as_usize()].pin_count())
    }

    /// Returns the pool size (an alias for [`size`](Self::size)).
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the number of frames on the free list (not yet assigned to
    /// any page).
    pub fn free_frame_count(&self) -> usize {
        self.state.free_list.lock().len()
    }

    /// Fetches a page into the buffer pool and returns its frame ID,
    /// pinning the frame and recording the access. If the page is already
    /// resident, reuses its frame; otherwise evicts or takes a free frame
    /// and reads the page from disk.
    fn fetch_page(&self, page_id: PageId, class: AccessClass) -> Result<FrameId> {
        {
            let page_table = self.state.page_table.lock();
            if let Some(&frame_id) = page_table.get(&page_id) {
                let frame = &self.state.frames[frame_id.as_usize()];
                frame.pin();
                self.state.replacer.record_access(frame_id, class);
                self.state.replacer.set_evictable(frame_id, false);
                return Ok(frame_id);
            }
        }

        let frame_id = self.get_free_frame()?;
        let frame = &self.state.frames[frame_id.as_usize()];

        let data = self.disk_scheduler.schedule_read_sync(page_id)?;

        frame.set_page_id(page_id);
        frame.copy_from(data.as_slice());
        frame.set_dirty(false);

        // Another thread may have missed on the same page concurrently and
        // already installed it into a different frame while this thread was
        // waiting on the disk read. Re-check under the page table lock
        // before installing, so at most one frame ever claims `page_id`.
        let frame_id = {
            let mut page_table = self.state.page_table.lock();
            if let Some(&existing_frame_id) = page_table.get(&page_id) {
                frame.reset();
                self.state.free_list.lock().push_back(frame_id);

                let existing_frame = &self.state.frames[existing_frame_id.as_usize()];
                existing_frame.pin();
                existing_frame_id
            } else {
                page_table.insert(page_id, frame_id);
                frame.pin();
                frame_id
            }
        };

        self.state.replacer.record_access(frame_id, class);
        self.state.replacer.set_evictable(frame_id, false);

        Ok(frame_id)
    }

    /// Gets a free frame, either from the free list or by evicting a page.
    fn get_free_frame(&self) -> Result<FrameId> {
        {
            let mut free_list = self.state.free_list.lock();
            if let Some(frame_id) = free_list.pop_front() {
                return Ok(frame_id);
            }
        }

        if let Some(frame_id) = self.state.replacer.evict() {
            let frame = &self.state.frames[frame_id.as_usize()];
            let old_page_id = frame.page_id();

            if frame.is_dirty() {
                let mut data = [0u8; PAGE_SIZE];
                frame.copy_to(&mut data);
                self.disk_scheduler
                    .schedule_write_sync(old_page_id, &data)?;
            }

            self.state.page_table.lock().remove(&old_page_id);
            frame.reset();

            Ok(frame_id)
        } else {
            Err(CrioError::BufferPoolFull)
        }
    }
}
