use sketch_calc::settings::Settings;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.log_file_path(), None);
}

#[test]
fn save_then_load_keeps_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let mut settings = Settings::default();
    settings.api_url = "http://calc.internal:5000/api".into();
    settings.eraser_size = 12;
    settings.swatches = vec!["#ff0000".into(), "rgb(0, 0, 255)".into()];
    settings.log_file = Some("sketch.log".into());
    settings.save(path).unwrap();

    let loaded = Settings::load(path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(
        loaded.log_file_path().as_deref(),
        Some(std::path::Path::new("sketch.log"))
    );
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = Settings::load(path.to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("parse settings file"));
}

#[test]
fn blank_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(
        Settings::load(path.to_str().unwrap()).unwrap(),
        Settings::default()
    );
}
