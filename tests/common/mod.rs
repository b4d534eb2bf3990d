#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use money_core::{
    ledger::{Ledger, ManualClock},
    storage::{JsonFileStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Clock pinned to 2026-10-16 09:00 UTC.
pub fn fixed_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap())
}

/// In-memory ledger plus handles to its store and clock.
pub fn memory_ledger() -> (Ledger, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = fixed_clock();
    let ledger = Ledger::new(Box::new(store.clone()), Box::new(clock.clone()));
    (ledger, store, clock)
}

/// Ledger persisted to `ledger.json` inside a fresh temp directory.
pub fn file_ledger(clock: &ManualClock) -> (Ledger, PathBuf) {
    let path = temp_home().join("ledger.json");
    let ledger = reopen(&path, clock);
    (ledger, path)
}

pub fn reopen(path: &PathBuf, clock: &ManualClock) -> Ledger {
    Ledger::new(Box::new(JsonFileStore::new(path)), Box::new(clock.clone()))
}
