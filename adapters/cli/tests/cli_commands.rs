use std::{
    env, fs,
    path::PathBuf,
    process::{Command, Output},
};

fn block_hopper(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_block-hopper"))
        .current_dir(env::temp_dir())
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("failed to run block-hopper")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

fn layout_path(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("block-hopper-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).expect("layout file written");
    path
}

#[test]
fn seed_lists_built_in_levels_in_order() {
    let levels = stdout_json(&block_hopper(&["seed"]));
    let names: Vec<&str> = levels
        .as_array()
        .expect("array of records")
        .iter()
        .map(|record| record["level"].as_str().expect("level name"))
        .collect();

    assert_eq!(names, ["1", "2", "3", "4", "5"]);
}

#[test]
fn exported_level_imports_cleanly() {
    let export = block_hopper(&["export", "3"]);
    assert!(export.status.success());
    let payload = String::from_utf8(export.stdout).expect("utf-8 payload");
    assert!(payload.starts_with("level:v1:24x10:"));

    let record = stdout_json(&block_hopper(&["import", payload.trim()]));
    assert_eq!(record["level"], "3");
    assert_eq!(record["next_level"], "4");
}

#[test]
fn locked_level_is_refused_without_purchase() {
    let output = block_hopper(&["play", "2"]);
    assert!(!output.status.success());

    let session = stdout_json(&block_hopper(&["play", "2", "--levels", "--sprite"]));
    assert_eq!(session["sprite"], "translate_robot-lb64");
    assert_eq!(session["next_level"], "3");
}

#[test]
fn free_level_hides_next_level() {
    let session = stdout_json(&block_hopper(&["play", "1"]));
    assert_eq!(session["sprite"], "android-64");
    assert!(session["next_level"].is_null());
}

#[test]
fn validate_prints_normalized_record() {
    let path = layout_path(
        "tower",
        r#"
        level = "tower"
        base_rows = 2
        static_column0 = 0
        static_rows0 = "2,3"
        moveable_column0 = 0
        moveable_rows0 = 4
        door_row = 7
        door_column = 12
        player_row = 2
        player_column = 5
        "#,
    );

    let record = stdout_json(&block_hopper(&[
        "validate",
        path.to_str().expect("utf-8 path"),
        "--actor",
        "ada",
    ]));

    assert_eq!(record["owner"], "ada");
    assert_eq!(record["layout"]["player_start"]["x"], 320);
    assert_eq!(record["layout"]["player_start"]["y"], 448);
    assert_eq!(record["layout"]["door"]["row"], 7);
}

#[test]
fn validate_rejects_reserved_name() {
    let path = layout_path(
        "reserved",
        r#"
        level = "5"
        base_rows = 2
        door_row = 7
        door_column = 12
        player_row = 2
        player_column = 5
        "#,
    );

    let output = block_hopper(&["validate", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
