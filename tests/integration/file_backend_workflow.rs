//! Integration test: manager and bindings over the file backend.

use std::sync::Arc;

use agentic_keychain::{
    FileBackend, Identity, ItemClass, KeychainBinding, KeychainConfig, KeychainError,
    StorageManager,
};

#[test]
fn file_backend_persists_across_managers() {
    let dir = tempfile::tempdir().unwrap();
    let config = KeychainConfig::new().service("com.example.persist");
    let id = Identity::generic("refresh-token");

    {
        let backend = Arc::new(FileBackend::new(dir.path()).unwrap());
        let manager = StorageManager::from_config(backend, &config);
        manager.create(&id, "rt-1").unwrap();
        manager.update(&id, "rt-2").unwrap();
    }

    let backend = Arc::new(FileBackend::new(dir.path()).unwrap());
    let manager = Arc::new(StorageManager::from_config(backend, &config));
    assert_eq!(manager.retrieve::<String>(&id).unwrap(), "rt-2");

    let field: KeychainBinding<String> = KeychainBinding::new(Arc::clone(&manager), id.clone());
    field.clear();
    assert_eq!(manager.retrieve::<String>(&id), Err(KeychainError::ItemNotFound));
}

#[test]
fn file_backend_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("keychain.json");
    std::fs::write(
        &config_path,
        r#"{ "service": "from-file", "synchronizable": false }"#,
    )
    .unwrap();

    let config = KeychainConfig::load(&config_path).unwrap();
    let backend = Arc::new(FileBackend::new(dir.path().join("items")).unwrap());
    let manager = StorageManager::from_config(backend, &config);

    manager.create(&Identity::generic("a"), &1u8).unwrap();
    manager.create(&Identity::generic("b"), &2u8).unwrap();
    assert_eq!(manager.keys(ItemClass::GenericPassword).unwrap(), vec!["a", "b"]);
    assert_eq!(manager.delete_all(ItemClass::GenericPassword).unwrap(), 2);
    assert!(manager.keys(ItemClass::GenericPassword).unwrap().is_empty());
}

#[test]
fn corrupted_item_reads_as_absent_through_binding() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path()).unwrap());
    let manager = Arc::new(StorageManager::new(backend));
    let id = Identity::generic("fragile");
    manager.create(&id, "ok").unwrap();

    let path = dir
        .path()
        .join("genp")
        .join(format!("{}.json", hex_key("fragile")));
    std::fs::write(&path, b"{ truncated").unwrap();

    let field: KeychainBinding<String> = KeychainBinding::new(Arc::clone(&manager), id.clone());
    assert_eq!(field.get(), None);
    assert!(matches!(
        manager.retrieve::<String>(&id),
        Err(KeychainError::InvalidData(_))
    ));
}

#[test]
fn binding_refuses_to_overwrite_corrupted_item() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path()).unwrap());
    let manager = Arc::new(StorageManager::new(backend));
    let id = Identity::generic("fragile");
    manager.create(&id, "ok").unwrap();

    let path = dir
        .path()
        .join("genp")
        .join(format!("{}.json", hex_key("fragile")));
    std::fs::write(&path, b"{ truncated").unwrap();

    let field: KeychainBinding<String> = KeychainBinding::new(Arc::clone(&manager), id);
    assert!(matches!(
        field.try_set(Some(&"replacement".to_string())),
        Err(KeychainError::InvalidData(_))
    ));
    assert_eq!(std::fs::read(&path).unwrap(), b"{ truncated");
}

#[test]
fn long_keys_round_trip_through_manager() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path()).unwrap());
    let manager = Arc::new(StorageManager::new(backend));

    let key = "https://accounts.example.com/oauth2/".to_string() + &"scope/".repeat(40);
    let id = Identity::generic(key.clone());
    manager.create(&id, "token").unwrap();
    assert_eq!(manager.retrieve::<String>(&id).unwrap(), "token");

    let field: KeychainBinding<String> = KeychainBinding::new(Arc::clone(&manager), id.clone());
    field.set(Some("rotated".into()));
    assert_eq!(field.get().as_deref(), Some("rotated"));

    assert_eq!(manager.keys(ItemClass::GenericPassword).unwrap(), vec![key]);
    manager.delete(&id).unwrap();
    assert_eq!(manager.retrieve::<String>(&id), Err(KeychainError::ItemNotFound));
}

#[test]
fn delete_all_skips_corrupted_files() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path()).unwrap());
    let manager = StorageManager::new(backend);
    manager.create(&Identity::generic("a"), &1u8).unwrap();
    manager.create(&Identity::generic("b"), &2u8).unwrap();
    manager.create(&Identity::generic("bad"), &3u8).unwrap();

    let path = dir
        .path()
        .join("genp")
        .join(format!("{}.json", hex_key("bad")));
    std::fs::write(&path, b"garbage").unwrap();

    assert_eq!(manager.keys(ItemClass::GenericPassword).unwrap(), vec!["a", "b"]);
    assert_eq!(manager.delete_all(ItemClass::GenericPassword).unwrap(), 2);
    assert!(path.exists());
}

fn hex_key(key: &str) -> String {
    key.bytes().map(|b| format!("{b:02x}")).collect()
}
