//! File-based loading tests.

use std::fs;

use colmatch_ingest::{load_groundtruth, load_target_schema, read_csv_frame, read_csv_str};
use colmatch_model::ColumnType;
use polars::prelude::DataType;

#[test]
fn reads_source_csv_with_inferred_types() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("source.csv");
    fs::write(&path, "Gender,Age\nFemale,34\nMale,51\n").expect("write csv");

    let df = read_csv_frame(&path).expect("read csv");
    assert_eq!(df.height(), 2);
    assert_eq!(df.column("Gender").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Int64);
}

#[test]
fn reads_csv_text() {
    let df = read_csv_str("a,b\n1,x\n2,y\n").expect("parse csv");
    assert_eq!(df.width(), 2);
    assert_eq!(df.height(), 2);
}

#[test]
fn missing_csv_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = read_csv_frame(dir.path().join("nope.csv")).unwrap_err();
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn loads_dictionary_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dictionary.json");
    fs::write(
        &path,
        r#"{"properties":[{"name":"vital_status","type":"enum","enum":["Alive","Dead"]}]}"#,
    )
    .expect("write dictionary");

    let schema = load_target_schema(&path).expect("load dictionary");
    assert_eq!(schema.column_type("vital_status"), ColumnType::String);
    assert_eq!(schema.properties[0].enum_values, ["Alive", "Dead"]);
}

#[test]
fn missing_groundtruth_file_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_groundtruth(dir.path().join("gt.csv")).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn loads_groundtruth_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("gt.csv");
    fs::write(&path, "source,target\nGender,gender\n").expect("write gt");
    let pairs = load_groundtruth(&path).expect("load gt");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].target_column, "gender");
}
