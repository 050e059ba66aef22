use std::sync::Arc;

use crio::buffer::BufferPoolManager;
use crio::common::{PageId, RecordId, SlotId};
use crio::index::{DefaultComparator, DefaultHashFunction, ExtendibleHashTable};
use crio::storage::disk::DiskManager;

fn main() {
    env_logger::init();

    println!("Crio - a disk-oriented storage engine core");
    println!("============================================\n");

    let db_path = "demo.db";
    let disk_manager = Arc::new(DiskManager::new(db_path).expect("failed to create disk manager"));
    println!("Created disk manager for: {db_path}");

    let bpm = Arc::new(BufferPoolManager::new(10, 2, disk_manager));
    println!("Created buffer pool manager with 10 frames\n");

    let table = ExtendibleHashTable::new(
        "demo",
        Arc::clone(&bpm),
        Arc::new(DefaultComparator),
        Arc::new(DefaultHashFunction),
        9,
        9,
        4,
    )
    .expect("failed to create hash table");
    println!(
        "Created extendible hash index, header page {}\n",
        table.get_header_page_id()
    );

    let entries: Vec<(i64, RecordId)> = (0..8)
        .map(|i| (i, RecordId::new(PageId::new(i as i32), SlotId::new(0))))
        .collect();

    for (key, rid) in &entries {
        let inserted = table.insert(*key, *rid).expect("insert failed");
        println!("Inserted {key} -> {rid:?} ({inserted})");
    }

    for (key, _) in &entries {
        let mut out = Vec::new();
        table.get(key, &mut out).expect("lookup failed");
        println!("Lookup {key}: {out:?}");
    }

    table.verify_integrity().expect("index integrity check failed");
    println!("\nIndex integrity verified.");

    std::fs::remove_file(db_path).ok();
    println!("Demo completed successfully!");
}
