use crate::common::PAGE_SIZE;

/// Magic number stamped into the reserved first page/slot of the backing
/// file, "CRIO" read as a little-endian u32.
pub const DB_HEADER_MAGIC: u32 = 0x4352494F;
pub const DB_HEADER_VERSION: u32 = 1;

const MAGIC_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 4;
const NEXT_PAGE_ID_OFFSET: usize = 8;

/// Typed view over the backing file's reserved header slot. Intentionally
/// minimal: this core carries no catalog, so besides the format fingerprint
/// checked on reopen, the only other state it stamps is the page-ID
/// allocation counter, so a reopened database resumes handing out fresh IDs
/// instead of colliding with pages already materialized on disk.
pub struct DbHeaderPage<'a> {
    data: &'a mut [u8],
}

impl<'a> DbHeaderPage<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        assert_eq!(data.len(), PAGE_SIZE);
        Self { data }
    }

    pub fn init(&mut self) {
        self.data[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(&DB_HEADER_MAGIC.to_le_bytes());
        self.data[VERSION_OFFSET..VERSION_OFFSET + 4]
            .copy_from_slice(&DB_HEADER_VERSION.to_le_bytes());
        self.set_next_page_id(0);
    }

    pub fn set_next_page_id(&mut self, next_page_id: i32) {
        self.data[NEXT_PAGE_ID_OFFSET..NEXT_PAGE_ID_OFFSET + 4]
            .copy_from_slice(&next_page_id.to_le_bytes());
    }
}

pub struct DbHeaderPageRef<'a> {
    data: &'a [u8],
}

impl<'a> DbHeaderPageRef<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        assert_eq!(data.len(), PAGE_SIZE);
        Self { data }
    }

    pub fn magic(&self) -> u32 {
        u32::from_le_bytes(self.data[MAGIC_OFFSET..MAGIC_OFFSET + 4].try_into().unwrap())
    }

    pub fn version(&self) -> u32 {
        u32::from_le_bytes(
            self.data[VERSION_OFFSET..VERSION_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.magic() == DB_HEADER_MAGIC
    }

    pub fn next_page_id(&self) -> i32 {
        i32::from_le_bytes(
            self.data[NEXT_PAGE_ID_OFFSET..NEXT_PAGE_ID_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let mut data = [0u8; PAGE_SIZE];
        {
            let mut header = DbHeaderPage::new(&mut data);
            header.init();
        }
        let header = DbHeaderPageRef::new(&data);
        assert!(header.is_valid());
        assert_eq!(header.version(), DB_HEADER_VERSION);
        assert_eq!(header.next_page_id(), 0);
    }

    #[test]
    fn test_header_next_page_id_round_trips() {
        let mut data = [0u8; PAGE_SIZE];
        {
            let mut header = DbHeaderPage::new(&mut data);
            header.init();
            header.set_next_page_id(42);
        }
        let header = DbHeaderPageRef::new(&data);
        assert_eq!(header.next_page_id(), 42);
    }

    #[test]
    fn test_header_rejects_garbage() {
        let data = [0u8; PAGE_SIZE];
        let header = DbHeaderPageRef::new(&data);
        assert!(!header.is_valid());
    }
}
