//! Basic Keychain — store, bind, and inspect credentials.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic_keychain -p agentic-keychain

use std::sync::Arc;

use agentic_keychain::item_class::attr;
use agentic_keychain::{
    Accessibility, FileBackend, Identity, ItemClass, KeychainBinding, KeychainConfig,
    KeychainError, StorageManager,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OAuthToken {
    access_token: String,
    refresh_token: String,
    expires_at: u64,
}

fn main() -> Result<(), KeychainError> {
    env_logger::init();

    // ── 1. Build one shared manager ─────────────────────────────────────────
    //
    // The file backend keeps the walkthrough inspectable on disk. Every query
    // carries the service name and accessibility from the config.
    let dir = std::env::temp_dir().join("agentic-keychain-example");
    let backend = Arc::new(FileBackend::new(&dir)?);
    let config = KeychainConfig::new()
        .service("tech.agentra.example")
        .accessibility(Accessibility::AfterFirstUnlock);
    let manager = Arc::new(StorageManager::from_config(backend, &config));
    manager.delete_all(ItemClass::GenericPassword)?;
    println!("Keychain at {}", dir.display());
    println!();

    // ── 2. Strict CRUD through the manager ──────────────────────────────────
    let api_key = Identity::generic("openai/api_key");
    manager.create(&api_key, "sk-example")?;
    match manager.create(&api_key, "sk-other") {
        Err(KeychainError::DuplicateItem) => println!("Second create rejected: duplicate"),
        other => println!("Unexpected: {other:?}"),
    }
    let stored: String = manager.retrieve(&api_key)?;
    println!("api_key = {stored}");

    let record = manager.retrieve_record(&api_key)?;
    println!(
        "  created {}  service {}",
        record.created_at_rfc3339(),
        record
            .attributes
            .get(attr::SERVICE)
            .map(|v| v.to_string())
            .unwrap_or_default()
    );
    println!();

    // ── 3. A binding behaves like an optional field ─────────────────────────
    let token: KeychainBinding<OAuthToken> =
        KeychainBinding::new(Arc::clone(&manager), Identity::generic("oauth/token"));

    println!("token before set: {:?}", token.get());
    token.set(Some(OAuthToken {
        access_token: "at-1".into(),
        refresh_token: "rt-1".into(),
        expires_at: 1_800_000_000,
    }));
    token.set(Some(OAuthToken {
        access_token: "at-2".into(),
        refresh_token: "rt-1".into(),
        expires_at: 1_800_003_600,
    }));
    if let Some(current) = token.get() {
        println!("token after refresh: {}", current.access_token);
    }

    token.clear();
    println!("token after clear: {:?}", token.get());
    println!();

    // ── 4. Enumerate and clean up ───────────────────────────────────────────
    println!("generic keys: {:?}", manager.keys(ItemClass::GenericPassword)?);
    let removed = manager.delete_all(ItemClass::GenericPassword)?;
    println!("removed {removed} item(s)");

    Ok(())
}
