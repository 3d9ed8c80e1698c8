use std::fs;
use std::path::Path;

use tempfile::tempdir;
use ui::{validate_path, ValidateOptions};

const HEADER: &str = r#"<Activity mc:Ignorable="sap sap2010" x:Class="Main"
 xmlns="http://schemas.microsoft.com/netfx/2009/xaml/activities"
 xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"
 xmlns:sap="http://schemas.microsoft.com/netfx/2009/xaml/activities/presentation"
 xmlns:sap2010="http://schemas.microsoft.com/netfx/2010/xaml/activities/presentation"
 xmlns:ui="http://schemas.uipath.com/workflow/activities"
 xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">"#;

const CLEAN: &str = r#"<Sequence DisplayName="Main">
  <ui:LogMessage Level="Info" Message="[&quot;start&quot;]" />
</Sequence>"#;

/// A LogMessage without Level: one warning, no errors
const WARNING_ONLY: &str = r#"<Sequence DisplayName="Main">
  <ui:LogMessage Message="[&quot;start&quot;]" />
</Sequence>"#;

fn document(body: &str) -> String {
    format!("{}\n{}\n</Activity>", HEADER, body)
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), document(body)).unwrap();
}

fn run(path: &Path, strict: bool, json: bool) -> (i32, String) {
    colored::control::set_override(false);
    let options = ValidateOptions {
        strict,
        json,
        ..ValidateOptions::default()
    };
    let mut out = Vec::new();
    let code = validate_path(path, &options, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_single_clean_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "Main.xaml", CLEAN);

    let (code, text) = run(&dir.path().join("Main.xaml"), false, false);
    assert_eq!(code, 0);
    assert!(text.contains("Result: VALID (0 error(s), 0 warning(s))"));
    assert!(!text.contains("Summary:"));
}

#[test]
fn test_strict_mode_fails_on_warnings() {
    let dir = tempdir().unwrap();
    write(dir.path(), "Main.xaml", WARNING_ONLY);
    let path = dir.path().join("Main.xaml");

    let (code, text) = run(&path, false, false);
    assert_eq!(code, 0);
    assert!(text.contains("Result: VALID (0 error(s), 1 warning(s))"));

    let (code, _) = run(&path, true, false);
    assert_eq!(code, 1);
}

#[test]
fn test_directory_summary() {
    let dir = tempdir().unwrap();
    write(dir.path(), "First.xaml", CLEAN);
    write(dir.path(), "Second.xaml", CLEAN);
    fs::create_dir(dir.path().join("Sub")).unwrap();
    fs::write(dir.path().join("Sub").join("Broken.xaml"), "<Activity><Sequence></Activity>").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a workflow").unwrap();

    let (code, text) = run(dir.path(), false, false);
    assert_eq!(code, 1);
    assert!(text.trim_end().ends_with("Summary: 2/3 files valid"));

    let first = text.find("First.xaml").unwrap();
    let second = text.find("Second.xaml").unwrap();
    let broken = text.find("Broken.xaml").unwrap();
    assert!(first < second && second < broken);
}

#[test]
fn test_directory_json_has_one_object_per_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "First.xaml", CLEAN);
    write(dir.path(), "Second.xaml", WARNING_ONLY);

    let (code, text) = run(dir.path(), false, true);
    assert_eq!(code, 0);
    assert!(!text.contains("Summary:"));

    let objects: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&text)
        .into_iter::<serde_json::Value>()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(objects.len(), 2);
    assert!(objects[0]["file_path"].as_str().unwrap().ends_with("First.xaml"));
    assert_eq!(objects[1]["warning_count"], 1);
}

#[test]
fn test_json_output_is_stable() {
    let dir = tempdir().unwrap();
    write(dir.path(), "Main.xaml", WARNING_ONLY);
    let path = dir.path().join("Main.xaml");

    let (_, first) = run(&path, false, true);
    let (_, second) = run(&path, false, true);
    assert_eq!(first, second);
}

#[test]
fn test_missing_path_reports_input_error() {
    let dir = tempdir().unwrap();
    let (code, text) = run(&dir.path().join("Nope.xaml"), false, true);

    assert_eq!(code, 1);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["issues"][0]["rule"], "Input");
    assert_eq!(value["hr_compliance"]["Input"], "FAIL");
}
