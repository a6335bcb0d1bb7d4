//! Scale test: thousands of items across classes.

use std::sync::Arc;

use agentic_keychain::{FileBackend, Identity, ItemClass, MemoryBackend, StorageManager};
use rand::Rng;

#[test]
fn scale_10k_items_memory() {
    let manager = StorageManager::new(Arc::new(MemoryBackend::new()));
    let mut rng = rand::thread_rng();

    let mut expected = Vec::with_capacity(10_000);
    for i in 0..10_000 {
        let class = ItemClass::ALL[i % ItemClass::ALL.len()];
        let id = Identity::new(class, format!("item-{i}"));
        let payload: Vec<u8> = (0..rng.gen_range(1..256)).map(|_| rng.gen()).collect();
        manager.create(&id, &payload).unwrap();
        expected.push((id, payload));
    }

    for (id, payload) in &expected {
        assert_eq!(&manager.retrieve::<Vec<u8>>(id).unwrap(), payload);
    }

    let total: usize = ItemClass::ALL
        .iter()
        .map(|class| manager.keys(*class).unwrap().len())
        .sum();
    assert_eq!(total, 10_000);
}

#[test]
fn scale_500_items_file() {
    let dir = tempfile::tempdir().unwrap();
    let manager = StorageManager::new(Arc::new(FileBackend::new(dir.path()).unwrap()));

    for i in 0..500 {
        manager
            .create(&Identity::generic(format!("file-item-{i}")), &i)
            .unwrap();
    }
    for i in 0..500 {
        let read: i32 = manager
            .retrieve(&Identity::generic(format!("file-item-{i}")))
            .unwrap();
        assert_eq!(read, i);
    }
    assert_eq!(manager.delete_all(ItemClass::GenericPassword).unwrap(), 500);
}
