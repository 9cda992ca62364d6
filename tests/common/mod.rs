#![allow(dead_code)]

use std::path::Path;

use polygon_uploader::opt::{RemoteOpt, UploadOpt};
use polygon_uploader_api::memory::MemoryState;
use polygon_uploader_api::TestRecord;

pub fn setup() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .is_test(true)
        .try_init();
}

/// Write the given files, creating the missing directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

/// The options of a run that never contacts Polygon.
pub fn dry_run() -> RemoteOpt {
    RemoteOpt {
        auth_file: None,
        create: false,
        dry_run: true,
    }
}

pub fn upload_opt() -> UploadOpt {
    UploadOpt {
        on_error: None,
        retries: 0,
        no_check_existing: false,
        test_set: "tests".into(),
    }
}

/// Input, group and points of the stored tests, by index.
pub fn summary(tests: &[TestRecord]) -> Vec<(u32, String, Option<String>, Option<u32>)> {
    tests
        .iter()
        .map(|t| (t.index, t.input.clone(), t.group.clone(), t.points))
        .collect()
}

pub fn tests_of(state: &MemoryState) -> Vec<TestRecord> {
    state
        .tests
        .get("tests")
        .map(|tests| tests.values().cloned().collect())
        .unwrap_or_default()
}
