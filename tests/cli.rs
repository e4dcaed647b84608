use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn tui_capture(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tui-capture"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run tui-capture")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn dry_run_shows_default_prefix() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "app_module = \"tests.conftest\"\napp_class = \"SimpleTestApp\"\n\n[[step]]\ntype = \"capture\"\n",
    )
    .unwrap();

    let out = tui_capture(tmp.path(), &["config.toml", "--dry-run"]);

    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("Capture Prefix: capture"), "{text}");
    assert!(text.contains("output=\"capture_001\""), "{text}");
    assert_eq!(entries(tmp.path()), vec!["config.toml"]);
}

#[test]
fn dry_run_shows_custom_prefix() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        r#"app_module = "tests.conftest"
app_class = "SimpleTestApp"
capture_prefix = "my_sequence"

[[step]]
type = "capture"

[[step]]
type = "capture"
"#,
    )
    .unwrap();

    let out = tui_capture(tmp.path(), &["config.toml", "--dry-run"]);

    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("Capture Prefix: my_sequence"), "{text}");
    assert!(text.contains("output=\"my_sequence_001\""), "{text}");
    assert!(text.contains("output=\"my_sequence_002\""), "{text}");
}

#[test]
fn invalid_config_exits_with_config_status() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "app_module = \"demo_app\"\napp_class = \"DemoApp\"\ncapture_prefix = \"a/b\"\n[[step]]\ntype = \"capture\"\n",
    )
    .unwrap();

    let out = tui_capture(tmp.path(), &["config.toml"]);

    assert_eq!(out.status.code(), Some(2));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("capture_prefix"), "{err}");
    assert_eq!(entries(tmp.path()), vec!["config.toml"]);
}

#[test]
fn unknown_application_exits_with_resolution_status() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "app_module = \"nowhere\"\napp_class = \"Ghost\"\n[[step]]\ntype = \"capture\"\n",
    )
    .unwrap();

    let out = tui_capture(tmp.path(), &["--input", "config.toml"]);

    assert_eq!(out.status.code(), Some(3));
    assert_eq!(entries(tmp.path()), vec!["config.toml"]);
}

#[test]
fn legacy_flags_capture_the_demo_app() {
    let tmp = TempDir::new().unwrap();

    let out = tui_capture(
        tmp.path(),
        &["--keys", "tab,enter", "--delay", "0", "--output", "shot.svg"],
    );

    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        entries(tmp.path()),
        vec!["shot.svg", "shot.txt", "shot_tooltips.txt"]
    );
    let text = fs::read_to_string(tmp.path().join("shot.txt")).unwrap();
    assert!(text.contains("Running selected operation..."));
}

#[test]
fn legacy_dry_run_lists_steps() {
    let tmp = TempDir::new().unwrap();

    let out = tui_capture(
        tmp.path(),
        &["--click", "Run Selected", "--dry-run"],
    );

    assert_eq!(out.status.code(), Some(0));
    let text = stdout(&out);
    assert!(text.contains("App: demo_app.DemoApp"), "{text}");
    assert!(text.contains("target=\"Button#RunSelected\""), "{text}");
    assert!(text.contains("output=\"demo-snapshot\""), "{text}");
    assert!(entries(tmp.path()).is_empty());
}

#[test]
fn single_shot_flags_conflict_with_a_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("c.toml"),
        "app_module = \"demo_app\"\napp_class = \"DemoApp\"\n[[step]]\ntype = \"capture\"\n",
    )
    .unwrap();

    for extra in [["--keys", "tab"], ["--click", "Cancel"], ["--output", "x"], ["--delay", "1"]] {
        let mut args = vec!["c.toml", "--dry-run"];
        args.extend(extra);
        let out = tui_capture(tmp.path(), &args);
        assert_eq!(out.status.code(), Some(2), "{extra:?}");
        assert!(stdout(&out).is_empty(), "{extra:?}");
    }

    let out = tui_capture(tmp.path(), &["--input", "c.toml", "--keys", "tab", "--dry-run"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stdout(&out).is_empty());
    assert_eq!(entries(tmp.path()), vec!["c.toml"]);
}

#[test]
fn fatal_error_is_reported_once() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "app_module = \"demo_app\"\napp_class = \"DemoApp\"\n[[step]]\ntype = \"capture\"\noutput = \"\"\n",
    )
    .unwrap();

    let out = tui_capture(tmp.path(), &["config.toml"]);

    assert_eq!(out.status.code(), Some(2));
    let err = String::from_utf8_lossy(&out.stderr);
    assert_eq!(err.matches("'step[0].output' cannot be empty").count(), 1, "{err}");
}
