// SPDX-License-Identifier: MIT

use super::*;
use crate::event::StoreEvent;
use gantry_core::{Job, JobId};
use std::io::Write as _;
use tempfile::tempdir;

#[test]
fn round_trips_through_zstd_compression() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");

    let mut state = MaterializedState::default();
    let id = JobId::new();
    state.apply(&StoreEvent::JobCreated { job: Job::new_root(id, "parent", "root", 0) });

    save_snapshot(&path, 7, &state).unwrap();
    let loaded = load_snapshot(&path).unwrap().unwrap();

    assert_eq!(loaded.seq, 7);
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert!(loaded.state.get_job(&id).is_some());
}

#[test]
fn missing_file_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist.bin");
    assert!(load_snapshot(&path).unwrap().is_none());
}

#[test]
fn saving_twice_rotates_previous_snapshot_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");

    save_snapshot(&path, 1, &MaterializedState::default()).unwrap();
    save_snapshot(&path, 2, &MaterializedState::default()).unwrap();

    let bak = path.with_extension("bak");
    assert!(bak.exists());
    assert_eq!(load_snapshot(&bak).unwrap().unwrap().seq, 1);
    assert_eq!(load_snapshot(&path).unwrap().unwrap().seq, 2);
}

#[test]
fn corrupt_zstd_payload_errors_instead_of_panicking() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    let mut file = File::create(&path).unwrap();
    file.write_all(b"\x28\xb5\x2f\xfdCORRUPT").unwrap();
    file.sync_all().unwrap();

    assert!(load_snapshot(&path).is_err());
}
