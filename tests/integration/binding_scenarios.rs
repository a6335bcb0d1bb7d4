//! Integration test: reactive bindings over a shared manager.
//!
//! Walks the assignment state machine (unbound -> bound -> bound -> unbound)
//! and checks that errors stay out of the caller's way.

use std::sync::{Arc, Mutex};

use agentic_keychain::{
    BincodeCodec, Identity, KeychainBinding, KeychainError, MemoryBackend, StorageManager,
    WriteOutcome,
};

#[test]
fn scenario_generic_k1() {
    let manager = Arc::new(StorageManager::new(Arc::new(MemoryBackend::new())));
    let errors = Arc::new(Mutex::new(Vec::<KeychainError>::new()));
    let sink = Arc::clone(&errors);
    let field: KeychainBinding<String> =
        KeychainBinding::new(Arc::clone(&manager), Identity::generic("K1"))
            .with_error_sink(move |_, err| sink.lock().unwrap().push(err.clone()));

    // ── unbound -> bound ────────────────────────────────────────────────────
    field.set(Some("v1".into()));
    assert_eq!(field.get().as_deref(), Some("v1"));
    assert!(field.is_bound());

    // ── bound -> bound ──────────────────────────────────────────────────────
    field.set(Some("v2".into()));
    let read = field.get();
    assert_eq!(read.as_deref(), Some("v2"));
    assert_ne!(read.as_deref(), Some("v1"));

    // ── bound -> unbound, twice ─────────────────────────────────────────────
    field.set(None);
    assert_eq!(field.get(), None);
    field.set(None);
    assert_eq!(field.get(), None);
    assert!(!field.is_bound());

    assert!(errors.lock().unwrap().is_empty());

    // The manager sees exactly what the binding wrote.
    assert_eq!(
        manager.retrieve::<String>(&Identity::generic("K1")),
        Err(KeychainError::ItemNotFound)
    );
}

#[test]
fn binding_and_manager_interleave() {
    let manager = Arc::new(StorageManager::new(Arc::new(MemoryBackend::new())));
    let id = Identity::generic("interleaved");
    let field: KeychainBinding<Vec<String>> = KeychainBinding::new(Arc::clone(&manager), id.clone());

    manager.create(&id, &vec!["scope:read".to_string()]).unwrap();
    assert_eq!(field.try_set(Some(&vec!["scope:write".to_string()])), Ok(WriteOutcome::Updated));
    assert_eq!(
        manager.retrieve::<Vec<String>>(&id).unwrap(),
        vec!["scope:write".to_string()]
    );

    manager.delete(&id).unwrap();
    assert_eq!(field.try_set(Some(&vec![])), Ok(WriteOutcome::Created));
    assert_eq!(field.get(), Some(vec![]));
}

#[test]
fn bindings_with_bincode_codec() {
    let manager = Arc::new(StorageManager::with_codec(
        Arc::new(MemoryBackend::new()),
        BincodeCodec,
    ));
    let counter: KeychainBinding<u64, BincodeCodec> =
        KeychainBinding::new(Arc::clone(&manager), Identity::generic("counter"));

    for n in 0..10u64 {
        let next = counter.get().unwrap_or(0) + 1;
        counter.set(Some(next));
        assert_eq!(counter.get(), Some(n + 1));
    }
}

#[test]
fn many_bindings_one_manager() {
    let manager = Arc::new(StorageManager::new(Arc::new(MemoryBackend::new())));
    let fields: Vec<KeychainBinding<String>> = (0..20)
        .map(|i| KeychainBinding::new(Arc::clone(&manager), Identity::generic(format!("field-{i}"))))
        .collect();

    for (i, field) in fields.iter().enumerate() {
        field.set(Some(format!("value-{i}")));
    }
    for (i, field) in fields.iter().enumerate() {
        assert_eq!(field.get(), Some(format!("value-{i}")));
    }
    for field in fields.iter().step_by(2) {
        field.clear();
    }
    assert_eq!(
        manager
            .keys(agentic_keychain::ItemClass::GenericPassword)
            .unwrap()
            .len(),
        10
    );
}
