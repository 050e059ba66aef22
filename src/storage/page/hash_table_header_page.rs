use crate::common::{PageId, INVALID_PAGE_ID};

const MAX_DEPTH_OFFSET: usize = 0;
const DIRECTORY_IDS_OFFSET: usize = 4;

/// Top level of the on-disk extendible hash index: maps the high bits of a
/// key's hash to a directory page. Fixed at construction time to
/// `2^max_depth` slots; `max_depth` never changes after `init`.
pub struct HashTableHeaderPage<'a> {
    data: &'a mut [u8],
}

impl<'a> HashTableHeaderPage<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    pub fn init(&mut self, max_depth: u32) {
        self.data.fill(0);
        self.data[MAX_DEPTH_OFFSET..MAX_DEPTH_OFFSET + 4].copy_from_slice(&max_depth.to_le_bytes());
        for i in 0..(1usize << max_depth) {
            self.set_directory_page_id(i, INVALID_PAGE_ID);
        }
    }

    pub fn max_depth(&self) -> u32 {
        u32::from_le_bytes(
            self.data[MAX_DEPTH_OFFSET..MAX_DEPTH_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }

    /// Index into the header's directory table for a 32-bit hash.
    pub fn hash_to_directory_index(&self, hash: u32) -> usize {
        let depth = self.max_depth();
        if depth == 0 {
            0
        } else {
            (hash >> (32 - depth)) as usize
        }
    }

    pub fn directory_page_id(&self, index: usize) -> PageId {
        let off = DIRECTORY_IDS_OFFSET + index * 4;
        PageId::new(i32::from_le_bytes(self.data[off..off + 4].try_into().unwrap()))
    }

    pub fn set_directory_page_id(&mut self, index: usize, page_id: PageId) {
        let off = DIRECTORY_IDS_OFFSET + index * 4;
        self.data[off..off + 4].copy_from_slice(&page_id.as_i32().to_le_bytes());
    }
}

/// Read-only counterpart of [`HashTableHeaderPage`].
pub struct HashTableHeaderPageRef<'a> {
    data: &'a [u8],
}

impl<'a> HashTableHeaderPageRef<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn max_depth(&self) -> u32 {
        u32::from_le_bytes(
            self.data[MAX_DEPTH_OFFSET..MAX_DEPTH_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }

    pub fn hash_to_directory_index(&self, hash: u32) -> usize {
        let depth = self.max_depth();
        if depth == 0 {
            0
        } else {
            (hash >> (32 - depth)) as usize
        }
    }

    pub fn directory_page_id(&self, index: usize) -> PageId {
        let off = DIRECTORY_IDS_OFFSET + index * 4;
        PageId::new(i32::from_le_bytes(self.data[off..off + 4].try_into().unwrap()))
    }
}
