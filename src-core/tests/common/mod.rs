use std::sync::Arc;

use summit_core::db::{DbPool, Store};
use tempfile::TempDir;

/// Builds a throwaway store in a temp directory. The returned TempDir must
/// stay alive for the duration of the test.
pub fn setup_store() -> (TempDir, Arc<DbPool>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::new(dir.path().to_str().unwrap()).expect("Failed to prepare store");
    let pool = store.acquire().expect("Failed to initialize store");
    (dir, pool)
}
