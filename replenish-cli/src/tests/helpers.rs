//! Test helpers for writing instance files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use replenish_core::Instance;
use replenish_core::test_support::InstanceBuilder;
use std::fs;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

pub(super) fn temp_root() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Four nodes that fit one vehicle with a single reload.
pub(super) fn reload_instance() -> Instance {
    InstanceBuilder::uniform(&[0, 5, 6, 4], 2)
        .capacity(10)
        .timeout(5.0)
        .build()
}

pub(super) fn write_instance(path: &Utf8Path, instance: &Instance) {
    let payload = serde_json::to_string_pretty(instance).expect("serialize instance");
    write_utf8(path, payload.as_bytes());
}
