use std::fs;

use taskdeck_core::Config;
use tempfile::tempdir;

#[test]
fn load_reads_file_and_overrides_apply_on_top() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("taskdeck.toml");
    fs::write(
        &path,
        "[toast]\nduration_ms = 3000\n\n[overlays]\nexclusive = true\n",
    )
    .expect("write config");

    let mut cfg = Config::load(Some(path.as_path())).expect("load config");
    assert_eq!(cfg.toast.duration_ms, 3_000);
    assert!(cfg.overlays.exclusive);

    cfg.apply_overrides([("toast.duration_ms".to_string(), "750".to_string())])
        .expect("apply override");
    assert_eq!(cfg.toast.duration_ms, 750);
    assert_eq!(cfg.endpoints.delete_url("1"), "/delete_task/1");
}

#[test]
fn load_reports_missing_file() {
    let temp = tempdir().expect("tempdir");
    let err = Config::load(Some(temp.path().join("absent.toml").as_path())).expect_err("missing file");
    assert!(format!("{err:#}").contains("failed to read"));
}

#[test]
fn load_reports_bad_toml() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("broken.toml");
    fs::write(&path, "[toast\nduration_ms = ").expect("write config");

    let err = Config::load(Some(path.as_path())).expect_err("invalid toml");
    assert!(format!("{err:#}").contains("invalid config"));
}
