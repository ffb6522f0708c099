//! End-to-end review runs through the library side of the CLI.

use std::fs;
use std::path::Path;

use colmatch_cli::export::{write_accepted_csv, write_mappings_json};
use colmatch_cli::inputs::{TaskInputs, load_config, open_task};
use colmatch_cli::script::{parse_script, run_script};
use colmatch_core::MatchingConfig;
use tempfile::tempdir;

const SOURCE: &str = "Gender,Age\nFemale,34\nMale,51\nFemale,67\n";

const DICTIONARY: &str = r#"{"properties": [
    {"name": "gender", "type": "enum", "enum": ["female", "male"]},
    {"name": "age_at_diagnosis", "type": "integer"},
    {"name": "sex", "type": "enum", "enum": ["female", "male"]}
]}"#;

fn write_inputs(dir: &Path) -> TaskInputs {
    let source = dir.join("source.csv");
    let target = dir.join("dictionary.json");
    fs::write(&source, SOURCE).unwrap();
    fs::write(&target, DICTIONARY).unwrap();
    TaskInputs::new(source, target)
}

#[test]
fn review_script_exports_accepted_columns() {
    let dir = tempdir().unwrap();
    let inputs = write_inputs(dir.path());
    let mut task = open_task(MatchingConfig::default(), &inputs).unwrap();
    task.get_candidates(true).unwrap();

    let steps = parse_script(
        r#"[
            {"operation": "accept", "sourceColumn": "Age", "targetColumn": "age_at_diagnosis"},
            {"operation": "reject", "sourceColumn": "Gender", "targetColumn": "sex"},
            {"operation": "undo"},
            {"operation": "redo"},
            {"operation": "redo"}
        ]"#,
    )
    .unwrap();
    let outcomes = run_script(&mut task, &steps).unwrap();
    assert_eq!(outcomes.len(), 5);
    assert_eq!(outcomes[2].operation, "undo reject");
    assert!(outcomes[3].applied);
    assert!(!outcomes[4].applied);
    assert_eq!(task.export_history().len(), 2);

    let csv_path = dir.path().join("accepted.csv");
    assert_eq!(write_accepted_csv(&task, &csv_path).unwrap(), 2);
    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines, ["gender,age_at_diagnosis", "Female,34", "Male,51", "Female,67"]);

    let mappings_path = dir.path().join("mappings.json");
    assert_eq!(write_mappings_json(&task, &mappings_path).unwrap(), 2);
    let mappings: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&mappings_path).unwrap()).unwrap();
    insta::assert_json_snapshot!(mappings, @r#"
    [
      {
        "sourceColumn": "Gender",
        "targetColumn": "gender"
      },
      {
        "sourceColumn": "Age",
        "targetColumn": "age_at_diagnosis"
      }
    ]
    "#);
}

#[test]
fn unknown_pair_stops_the_script() {
    let dir = tempdir().unwrap();
    let inputs = write_inputs(dir.path());
    let mut task = open_task(MatchingConfig::default(), &inputs).unwrap();
    task.get_candidates(true).unwrap();

    let steps = parse_script(
        r#"[{"operation": "accept", "sourceColumn": "Gender", "targetColumn": "missing"}]"#,
    )
    .unwrap();
    let error = run_script(&mut task, &steps).unwrap_err();
    assert!(format!("{error:#}").contains("no candidate Gender -> missing"));
    assert!(task.export_history().is_empty());
}

#[test]
fn csv_targets_load_without_a_dictionary() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.csv");
    let target = dir.path().join("target.csv");
    fs::write(&source, SOURCE).unwrap();
    fs::write(&target, "gender,age_at_diagnosis\nfemale,30\nmale,50\n").unwrap();

    let task = open_task(MatchingConfig::default(), &TaskInputs::new(source, target)).unwrap();
    assert!(task.target_schema().is_none());
    assert_eq!(task.target_df().unwrap().width(), 2);
}

#[test]
fn config_file_is_validated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"top_k": 5, "matchers": ["fuzzy_name"]}"#).unwrap();
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.top_k, 5);
    assert_eq!(config.matchers, ["fuzzy_name"]);

    fs::write(&path, r#"{"matchers": ["psychic"]}"#).unwrap();
    assert!(load_config(Some(&path)).is_err());
    assert_eq!(load_config(None).unwrap(), MatchingConfig::default());
}
