//! Shared fixtures for manager tests.

#![allow(dead_code)]

use scp_core::{NewScp, ScpDeletePolicy};
use scp_database::{MemoryStore, StoreCall};
use scp_integrity::ReferenceManager;
use std::sync::Arc;

/// A manager over a fresh in-memory store, plus a handle to inspect the store.
pub fn setup(policy: ScpDeletePolicy) -> (Arc<MemoryStore>, ReferenceManager<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let manager = ReferenceManager::new(Arc::clone(&store)).with_delete_policy(policy);
    (store, manager)
}

/// Create one SCP per key.
pub async fn seed_scps(manager: &ReferenceManager<MemoryStore>, keys: &[&str]) {
    for key in keys {
        manager
            .create_scp(NewScp::new(*key, format!("Entry {}", key)))
            .await
            .expect("seed SCP");
    }
}

/// Owned reference list.
pub fn refs(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// Recorded calls that could change a document.
pub fn writes(store: &MemoryStore) -> Vec<StoreCall> {
    store
        .calls()
        .into_iter()
        .filter(|call| call.operation.is_write())
        .collect()
}

/// Panic unless forward and back references are exact inverses.
pub async fn assert_consistent(manager: &ReferenceManager<MemoryStore>) {
    let report = manager.audit().await.expect("audit");
    assert!(report.is_consistent(), "inconsistent references: {:?}", report);
}
