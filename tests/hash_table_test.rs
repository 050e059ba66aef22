//! Integration tests for the extendible hash index, exercised end-to-end
//! against a real buffer pool and disk manager.

use std::sync::Arc;

use crio::buffer::BufferPoolManager;
use crio::common::{PageId, RecordId, SlotId};
use crio::index::{DefaultComparator, DefaultHashFunction, ExtendibleHashTable};
use crio::storage::disk::DiskManager;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tempfile::NamedTempFile;

fn new_table(
    pool_size: usize,
) -> (ExtendibleHashTable<i64, RecordId>, Arc<BufferPoolManager>, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
    let bpm = Arc::new(BufferPoolManager::new(pool_size, 2, dm));
    let table = ExtendibleHashTable::new(
        "rid_index",
        Arc::clone(&bpm),
        Arc::new(DefaultComparator),
        Arc::new(DefaultHashFunction),
        9,
        9,
        4,
    )
    .unwrap();
    (table, bpm, temp_file)
}

#[test]
fn test_insert_lookup_record_ids() {
    let (table, _bpm, _temp) = new_table(50);

    let rid1 = RecordId::new(PageId::new(1), SlotId::new(0));
    let rid2 = RecordId::new(PageId::new(1), SlotId::new(1));

    assert!(table.insert(10, rid1).unwrap());
    assert!(table.insert(20, rid2).unwrap());

    let mut out = Vec::new();
    assert!(table.get(&10, &mut out).unwrap());
    assert_eq!(out, vec![rid1]);

    out.clear();
    assert!(table.get(&20, &mut out).unwrap());
    assert_eq!(out, vec![rid2]);

    table.verify_integrity().unwrap();
}

#[test]
fn test_remove_record_id() {
    let (table, _bpm, _temp) = new_table(50);

    let rid = RecordId::new(PageId::new(3), SlotId::new(2));
    table.insert(1, rid).unwrap();
    assert!(table.remove(&1).unwrap());

    let mut out = Vec::new();
    assert!(!table.get(&1, &mut out).unwrap());
}

#[test]
fn test_survives_pool_eviction_pressure() {
    // A small buffer pool forces the header/directory/bucket pages to be
    // evicted and re-fetched from disk repeatedly across this workload.
    let (table, _bpm, _temp) = new_table(4);

    let entries: Vec<(i64, RecordId)> = (0..200)
        .map(|i| (i, RecordId::new(PageId::new(i as i32), SlotId::new(0))))
        .collect();

    for &(key, rid) in &entries {
        assert!(table.insert(key, rid).unwrap());
    }

    for &(key, rid) in &entries {
        let mut out = Vec::new();
        assert!(table.get(&key, &mut out).unwrap());
        assert_eq!(out, vec![rid]);
    }

    table.verify_integrity().unwrap();
}

#[test]
fn test_random_insert_remove_workload() {
    let (table, _bpm, _temp) = new_table(100);
    let mut rng = StdRng::seed_from_u64(7);

    let mut keys: Vec<i64> = (0..1_000).collect();
    keys.shuffle(&mut rng);

    for &k in &keys {
        let rid = RecordId::new(PageId::new(k as i32), SlotId::new((k % 64) as u16));
        assert!(table.insert(k, rid).unwrap());
    }

    let mut to_remove = keys.clone();
    to_remove.shuffle(&mut rng);
    let (removed, kept) = to_remove.split_at(to_remove.len() / 3);

    for &k in removed {
        assert!(table.remove(&k).unwrap());
    }

    for &k in kept {
        let mut out = Vec::new();
        assert!(table.get(&k, &mut out).unwrap());
        assert_eq!(
            out,
            vec![RecordId::new(PageId::new(k as i32), SlotId::new((k % 64) as u16))]
        );
    }

    for &k in removed {
        let mut out = Vec::new();
        assert!(!table.get(&k, &mut out).unwrap());
    }

    table.verify_integrity().unwrap();
}

#[test]
fn test_reopen_existing_header_page() {
    let (table, bpm, _temp) = new_table(20);

    let rid = RecordId::new(PageId::new(9), SlotId::new(0));
    table.insert(42, rid).unwrap();
    let header_page_id = table.get_header_page_id();

    let reopened = ExtendibleHashTable::<i64, RecordId>::open(
        "rid_index",
        Arc::clone(&bpm),
        Arc::new(DefaultComparator),
        Arc::new(DefaultHashFunction),
        header_page_id,
        9,
        9,
        4,
    );

    let mut out = Vec::new();
    assert!(reopened.get(&42, &mut out).unwrap());
    assert_eq!(out, vec![rid]);
}
