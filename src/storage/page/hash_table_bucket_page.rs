use std::marker::PhantomData;

const SIZE_OFFSET: usize = 0;
const MAX_SIZE_OFFSET: usize = 4;
const ENTRIES_OFFSET: usize = 8;

/// A fixed-width encoding for types stored directly in a hash bucket page.
/// Bucket pages reinterpret their backing bytes as a packed array of
/// `(K, V)` pairs, so both key and value types must serialize to a known,
/// constant number of bytes.
pub trait FixedWidthEncoding: Copy + Send + Sync + 'static {
    const ENCODED_SIZE: usize;

    fn encode(&self, out: &mut [u8]);
    fn decode(buf: &[u8]) -> Self;
}

macro_rules! impl_fixed_width_int {
    ($ty:ty) => {
        impl FixedWidthEncoding for $ty {
            const ENCODED_SIZE: usize = std::mem::size_of::<$ty>();

            fn encode(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn decode(buf: &[u8]) -> Self {
                <$ty>::from_le_bytes(buf.try_into().unwrap())
            }
        }
    };
}

impl_fixed_width_int!(i32);
impl_fixed_width_int!(i64);
impl_fixed_width_int!(u32);
impl_fixed_width_int!(u64);

impl FixedWidthEncoding for crate::common::RecordId {
    // page_id (4 bytes) + slot_id (2 bytes), padded to a 4-byte alignment.
    const ENCODED_SIZE: usize = 8;

    fn encode(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.page_id.as_i32().to_le_bytes());
        out[4..6].copy_from_slice(&self.slot_id.as_u16().to_le_bytes());
        out[6..8].fill(0);
    }

    fn decode(buf: &[u8]) -> Self {
        let page_id = crate::common::PageId::new(i32::from_le_bytes(buf[0..4].try_into().unwrap()));
        let slot_id = crate::common::SlotId::new(u16::from_le_bytes(buf[4..6].try_into().unwrap()));
        crate::common::RecordId::new(page_id, slot_id)
    }
}

/// Bottom level of the on-disk extendible hash index: a flat array of
/// `(key, value)` pairs, scanned linearly on lookup, insert, and remove.
pub struct HashTableBucketPage<'a, K, V> {
    data: &'a mut [u8],
    _marker: PhantomData<(K, V)>,
}

impl<'a, K: FixedWidthEncoding, V: FixedWidthEncoding> HashTableBucketPage<'a, K, V> {
    fn entry_size() -> usize {
        K::ENCODED_SIZE + V::ENCODED_SIZE
    }

    fn entry_offset(index: usize) -> usize {
        ENTRIES_OFFSET + index * Self::entry_size()
    }

    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            _marker: PhantomData,
        }
    }

    pub fn init(&mut self, max_size: u32) {
        self.data.fill(0);
        self.data[SIZE_OFFSET..SIZE_OFFSET + 4].copy_from_slice(&0u32.to_le_bytes());
        self.data[MAX_SIZE_OFFSET..MAX_SIZE_OFFSET + 4].copy_from_slice(&max_size.to_le_bytes());
    }

    pub fn size(&self) -> u32 {
        u32::from_le_bytes(self.data[SIZE_OFFSET..SIZE_OFFSET + 4].try_into().unwrap())
    }

    fn set_size(&mut self, size: u32) {
        self.data[SIZE_OFFSET..SIZE_OFFSET + 4].copy_from_slice(&size.to_le_bytes());
    }

    pub fn max_size(&self) -> u32 {
        u32::from_le_bytes(
            self.data[MAX_SIZE_OFFSET..MAX_SIZE_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.max_size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn entry_at(&self, index: usize) -> (K, V) {
        let off = Self::entry_offset(index);
        let key = K::decode(&self.data[off..off + K::ENCODED_SIZE]);
        let value = V::decode(&self.data[off + K::ENCODED_SIZE..off + Self::entry_size()]);
        (key, value)
    }

    fn set_entry_at(&mut self, index: usize, key: &K, value: &V) {
        let off = Self::entry_offset(index);
        let entry_size = Self::entry_size();
        key.encode(&mut self.data[off..off + K::ENCODED_SIZE]);
        value.encode(&mut self.data[off + K::ENCODED_SIZE..off + entry_size]);
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        (0..self.size() as usize).map(move |i| self.entry_at(i))
    }

    pub fn lookup(&self, key: &K, eq: impl Fn(&K, &K) -> bool) -> Option<V> {
        self.iter().find(|(k, _)| eq(k, key)).map(|(_, v)| v)
    }

    /// Appends `(key, value)`. Returns `false` if the bucket is already full;
    /// callers are responsible for rejecting duplicate keys before calling.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.is_full() {
            return false;
        }
        let idx = self.size() as usize;
        self.set_entry_at(idx, &key, &value);
        self.set_size(self.size() + 1);
        true
    }

    /// Removes the first entry matching `key` under `eq`, compacting the
    /// remaining entries. Returns `false` if no match was found.
    pub fn remove(&mut self, key: &K, eq: impl Fn(&K, &K) -> bool) -> bool {
        let size = self.size() as usize;
        let Some(pos) = (0..size).find(|&i| eq(&self.entry_at(i).0, key)) else {
            return false;
        };

        for i in pos..size - 1 {
            let (k, v) = self.entry_at(i + 1);
            self.set_entry_at(i, &k, &v);
        }
        self.set_size((size - 1) as u32);
        true
    }

    /// Removes and returns every entry for which `predicate` returns true,
    /// compacting the remainder. Used when splitting a bucket.
    pub fn drain_matching(&mut self, predicate: impl Fn(&K) -> bool) -> Vec<(K, V)> {
        let size = self.size() as usize;
        let mut kept = Vec::with_capacity(size);
        let mut drained = Vec::new();

        for i in 0..size {
            let entry = self.entry_at(i);
            if predicate(&entry.0) {
                drained.push(entry);
            } else {
                kept.push(entry);
            }
        }

        for (i, (k, v)) in kept.iter().enumerate() {
            self.set_entry_at(i, k, v);
        }
        self.set_size(kept.len() as u32);

        drained
    }
}

/// Read-only counterpart of [`HashTableBucketPage`], for lookups that only
/// hold a [`ReadPageGuard`](crate::buffer::ReadPageGuard).
pub struct HashTableBucketPageRef<'a, K, V> {
    data: &'a [u8],
    _marker: PhantomData<(K, V)>,
}

impl<'a, K: FixedWidthEncoding, V: FixedWidthEncoding> HashTableBucketPageRef<'a, K, V> {
    fn entry_size() -> usize {
        K::ENCODED_SIZE + V::ENCODED_SIZE
    }

    fn entry_offset(index: usize) -> usize {
        ENTRIES_OFFSET + index * Self::entry_size()
    }

    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            _marker: PhantomData,
        }
    }

    pub fn size(&self) -> u32 {
        u32::from_le_bytes(self.data[SIZE_OFFSET..SIZE_OFFSET + 4].try_into().unwrap())
    }

    pub fn max_size(&self) -> u32 {
        u32::from_le_bytes(
            self.data[MAX_SIZE_OFFSET..MAX_SIZE_OFFSET + 4]
                .try_into()
                .unwrap(),
        )
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.max_size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn entry_at(&self, index: usize) -> (K, V) {
        let off = Self::entry_offset(index);
        let key = K::decode(&self.data[off..off + K::ENCODED_SIZE]);
        let value = V::decode(&self.data[off + K::ENCODED_SIZE..off + Self::entry_size()]);
        (key, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        (0..self.size() as usize).map(move |i| self.entry_at(i))
    }

    pub fn lookup(&self, key: &K, eq: impl Fn(&K, &K) -> bool) -> Option<V> {
        self.iter().find(|(k, _)| eq(k, key)).map(|(_, v)| v)
    }
}

/// Capacity of a bucket page for the given key/value encoded widths.
pub fn bucket_max_size_for<K: FixedWidthEncoding, V: FixedWidthEncoding>(page_size: usize) -> u32 {
    let entry_size = K::ENCODED_SIZE + V::ENCODED_SIZE;
    ((page_size - ENTRIES_OFFSET) / entry_size) as u32
}
