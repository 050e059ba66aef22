//! Integration tests for the disk manager and scheduler

use std::sync::Arc;
use std::thread;

use crio::common::PAGE_SIZE;
use crio::storage::disk::{DiskManager, DiskScheduler};
use tempfile::NamedTempFile;

#[test]
fn test_disk_manager_create_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    assert_eq!(dm.get_num_reads(), 0);
    assert_eq!(dm.get_num_writes(), 0);
}

#[test]
fn test_disk_manager_allocate_pages() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    let mut page_ids = Vec::new();
    for _ in 0..10 {
        page_ids.push(dm.allocate_page().unwrap());
    }

    // IDs are assigned by a monotonic counter, so they are all distinct.
    for i in 0..page_ids.len() {
        for j in (i + 1)..page_ids.len() {
            assert_ne!(page_ids[i], page_ids[j]);
        }
    }
}

#[test]
fn test_disk_manager_read_write_page() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    let page_id = dm.allocate_page().unwrap();

    let mut write_data = [0u8; PAGE_SIZE];
    for (i, byte) in write_data.iter_mut().enumerate() {
        *byte = (i % 256) as u8;
    }
    dm.write_page(page_id, &write_data).unwrap();

    let mut read_data = [0u8; PAGE_SIZE];
    dm.read_page(page_id, &mut read_data).unwrap();

    assert_eq!(write_data, read_data);
}

#[test]
fn test_disk_manager_random_access() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    let page_ids: Vec<_> = (0..10).map(|_| dm.allocate_page().unwrap()).collect();

    let write_order = [5, 2, 8, 0, 7, 3, 9, 1, 6, 4];
    for &i in &write_order {
        let mut data = [0u8; PAGE_SIZE];
        data[0] = i as u8;
        dm.write_page(page_ids[i], &data).unwrap();
    }

    for (i, &page_id) in page_ids.iter().enumerate() {
        let mut data = [0u8; PAGE_SIZE];
        dm.read_page(page_id, &mut data).unwrap();
        assert_eq!(data[0], i as u8);
    }
}

#[test]
fn test_disk_manager_persistence() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    let test_data = b"Persistence test";
    let page_id;

    {
        let dm = DiskManager::new(&path).unwrap();
        page_id = dm.allocate_page().unwrap();

        let mut data = [0u8; PAGE_SIZE];
        data[..test_data.len()].copy_from_slice(test_data);
        dm.write_page(page_id, &data).unwrap();
        dm.sync().unwrap();
    }

    {
        let dm = DiskManager::new(&path).unwrap();

        let mut data = [0u8; PAGE_SIZE];
        dm.read_page(page_id, &mut data).unwrap();
        assert_eq!(&data[..test_data.len()], test_data);
    }
}

#[test]
fn test_disk_manager_unwritten_page_reads_zero() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    let page_id = dm.allocate_page().unwrap();
    let mut data = [0xAAu8; PAGE_SIZE];
    dm.read_page(page_id, &mut data).unwrap();
    assert!(data.iter().all(|&b| b == 0));
}

#[test]
fn test_disk_scheduler_basic() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
    let scheduler = DiskScheduler::new(dm);

    let page_id = scheduler.disk_manager().allocate_page().unwrap();

    let mut data = [0u8; PAGE_SIZE];
    data[0] = 42;
    scheduler.schedule_write_sync(page_id, &data).unwrap();

    let read_data = scheduler.schedule_read_sync(page_id).unwrap();
    assert_eq!(read_data[0], 42);
}

#[test]
fn test_disk_scheduler_multiple_requests() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
    let scheduler = DiskScheduler::new(dm);

    let page_ids: Vec<_> = (0..5)
        .map(|_| scheduler.disk_manager().allocate_page().unwrap())
        .collect();

    for (i, &pid) in page_ids.iter().enumerate() {
        let mut data = [0u8; PAGE_SIZE];
        data[0] = i as u8;
        scheduler.schedule_write_sync(pid, &data).unwrap();
    }

    for (i, &pid) in page_ids.iter().enumerate() {
        let data = scheduler.schedule_read_sync(pid).unwrap();
        assert_eq!(data[0], i as u8);
    }
}

#[test]
fn test_disk_scheduler_concurrent_requests() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = Arc::new(DiskManager::new(temp_file.path()).unwrap());
    let scheduler = Arc::new(DiskScheduler::new(dm));

    let page_ids: Vec<_> = (0..10)
        .map(|_| scheduler.disk_manager().allocate_page().unwrap())
        .collect();

    let handles: Vec<_> = page_ids
        .iter()
        .enumerate()
        .map(|(i, &pid)| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let mut data = [0u8; PAGE_SIZE];
                data[0] = i as u8;
                scheduler.schedule_write_sync(pid, &data).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for (i, &pid) in page_ids.iter().enumerate() {
        let data = scheduler.schedule_read_sync(pid).unwrap();
        assert_eq!(data[0], i as u8);
    }
}

#[test]
fn test_disk_manager_io_stats() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    assert_eq!(dm.get_num_reads(), 0);
    assert_eq!(dm.get_num_writes(), 0);

    let page_id = dm.allocate_page().unwrap();
    assert_eq!(dm.get_num_writes(), 0); // allocate_page only reserves an id.

    let data = [0u8; PAGE_SIZE];
    dm.write_page(page_id, &data).unwrap();
    assert_eq!(dm.get_num_writes(), 1);

    let mut read_data = [0u8; PAGE_SIZE];
    dm.read_page(page_id, &mut read_data).unwrap();
    assert_eq!(dm.get_num_reads(), 1);
}

#[test]
fn test_disk_manager_large_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    // Allocate many pages (100 pages = 400 KB) to exercise file growth.
    let page_ids: Vec<_> = (0..100).map(|_| dm.allocate_page().unwrap()).collect();

    for (i, &pid) in page_ids.iter().enumerate() {
        let mut data = [0u8; PAGE_SIZE];
        let id_bytes = (i as u32).to_le_bytes();
        data[..4].copy_from_slice(&id_bytes);
        dm.write_page(pid, &data).unwrap();
    }

    for (i, &pid) in page_ids.iter().enumerate() {
        let mut data = [0u8; PAGE_SIZE];
        dm.read_page(pid, &mut data).unwrap();
        let id_bytes: [u8; 4] = data[..4].try_into().unwrap();
        assert_eq!(u32::from_le_bytes(id_bytes), i as u32);
    }
}

#[test]
fn test_disk_manager_deallocate_and_reuse() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();

    let page_id = dm.allocate_page().unwrap();
    dm.write_page(page_id, &[7u8; PAGE_SIZE]).unwrap();
    dm.deallocate_page(page_id).unwrap();

    let other = dm.allocate_page().unwrap();
    assert_ne!(other, page_id);
    dm.write_page(other, &[9u8; PAGE_SIZE]).unwrap();

    let mut stale = [0u8; PAGE_SIZE];
    dm.read_page(page_id, &mut stale).unwrap();
    assert!(stale.iter().all(|&b| b == 0));
}

#[test]
fn test_disk_manager_rejects_foreign_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("garbage.db");
    std::fs::write(&db_path, vec![0xFFu8; PAGE_SIZE]).unwrap();

    let result = DiskManager::new(&db_path);
    assert!(result.is_err());
}

#[test]
fn test_disk_manager_get_db_path() {
    let temp_file = NamedTempFile::new().unwrap();
    let dm = DiskManager::new(temp_file.path()).unwrap();
    assert_eq!(dm.get_db_path(), temp_file.path());
}
