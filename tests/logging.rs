use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file_and_ignores_later_init() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sketch.log");

    sketch_calc::logging::init(true, Some(path.clone()));
    tracing::info!("sketch log line");

    // A second init must not panic or replace the installed subscriber.
    let other = dir.path().join("other.log");
    sketch_calc::logging::init(false, Some(other.clone()));
    tracing::info!("after second init");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("sketch log line"));
    assert!(contents.contains("after second init"));
    let other_contents = fs::read_to_string(&other).unwrap_or_default();
    assert!(!other_contents.contains("after second init"));
}
