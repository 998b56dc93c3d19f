use xcmatrix::core::config::{Configuration, Overrides};
use xcmatrix::core::error::ConfigError;
use xcmatrix::core::task::{Selection, TestTask};

const TASK: &str = r#"
workspace = "LayerKit.xcworkspace"
runner = "xctool"

[[subtasks]]
name = "unit"
scheme = "Unit Tests"
ios_versions = ["7.0", "7.1"]

[[subtasks]]
name = "functional"
scheme = "Functional Tests"
runner = "xcodebuild"
"#;

#[test]
fn test_task_names_include_versions() {
    let task = TestTask::from_toml_str(TASK).unwrap();
    assert_eq!(
        task.task_names(),
        vec!["test:unit", "test:unit:7.0", "test:unit:7.1", "test:functional"]
    );
}

#[test]
fn test_select_accepts_prefixed_and_versioned_selectors() {
    let task = TestTask::from_toml_str(TASK).unwrap();
    let selection = task
        .select(&["test:unit:7.1".to_string(), "functional".to_string()])
        .unwrap();
    assert_eq!(
        selection,
        vec![
            Selection { subtask: "unit".to_string(), ios_version: Some("7.1".to_string()) },
            Selection { subtask: "functional".to_string(), ios_version: None },
        ]
    );
    assert!(task.select(&["unit:8.0".to_string()]).is_err());
    assert!(task.select(&["integration".to_string()]).is_err());
}

#[test]
fn test_duplicate_subtask_names_are_rejected() {
    let mut base = Configuration::new();
    base.set_workspace("W.xcworkspace");
    let overrides = Overrides {
        scheme: Some("S".to_string()),
        ..Overrides::default()
    };
    let err = TestTask::new(
        "test",
        base,
        vec![("unit".to_string(), overrides.clone()), ("unit".to_string(), overrides)],
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Configuration(_)));
}

fn selection(subtask: &str, ios_version: Option<&str>) -> Selection {
    Selection {
        subtask: subtask.to_string(),
        ios_version: ios_version.map(str::to_string),
    }
}

fn selectors(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_select_follows_configured_order_and_absorbs_versions() {
    let task = TestTask::from_toml_str(TASK).unwrap();
    let selected = task
        .select(&selectors(&["functional", "unit", "unit:7.0"]))
        .unwrap();
    assert_eq!(selected, vec![selection("unit", None), selection("functional", None)]);
}

#[test]
fn test_select_lists_each_version_once() {
    let task = TestTask::from_toml_str(TASK).unwrap();
    let selected = task
        .select(&selectors(&["unit:7.1", "test:unit:7.0", "unit:7.1"]))
        .unwrap();
    assert_eq!(
        selected,
        vec![selection("unit", Some("7.0")), selection("unit", Some("7.1"))]
    );
}

#[test]
fn test_select_without_selectors_takes_every_subtask() {
    let task = TestTask::from_toml_str(TASK).unwrap();
    assert_eq!(
        task.select(&[]).unwrap(),
        vec![selection("unit", None), selection("functional", None)]
    );
}
