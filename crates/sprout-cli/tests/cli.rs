//! Run the `sprout` binary against scenario files.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn sprout() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sprout"))
}

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_apply_prints_world() {
    let scenario = write_file(
        r#"
        [[entity]]
        name = "t1"
        prototype = "truck"
        x = -100

        [[polygon]]
        kind = "route"
        name = "r"
        points = ["t1", "w2"]
        "#,
    );

    let output = sprout()
        .arg("apply")
        .arg(scenario.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let world: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = world
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["t1", "r", "w2"]);
    assert_eq!(world[0]["position"]["x"], -100.0);
}

#[test]
fn test_prototype_detail() {
    let output = sprout()
        .args(["prototypes", "--id", "complex-area-static"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["parent"], "complex-area");
    assert_eq!(detail["properties"]["polygon.closed"], true);
    assert_eq!(detail["capabilities"], serde_json::json!(["polygon"]));
}

#[test]
fn test_apply_failure_exits_nonzero() {
    let scenario = write_file(
        r#"
        [[entity]]
        name = "x"
        prototype = "submarine"
        "#,
    );

    let output = sprout()
        .arg("apply")
        .arg(scenario.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
}
