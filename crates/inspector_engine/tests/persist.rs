use std::fs;

use inspector_engine::{ensure_output_dir, result_filename, PersistError, ResultWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("output").join("nested");
    ensure_output_dir(&out).unwrap();
    assert!(out.is_dir());
}

#[test]
fn saving_twice_overwrites_the_same_report() {
    let temp = TempDir::new().unwrap();
    let writer = ResultWriter::new(temp.path().join("output"));

    let first = writer.save("task-1", b"first run").unwrap();
    assert_eq!(first.file_name().unwrap(), "translation_review_task-1.txt");
    assert_eq!(fs::read_to_string(&first).unwrap(), "first run");

    let second = writer.save("task-1", b"second run").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "second run");

    let entries: Vec<_> = fs::read_dir(writer.dir()).unwrap().collect();
    assert_eq!(entries.len(), 1, "temp files must not be left behind");
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("output");
    fs::write(&blocker, "x").unwrap();

    let result = ResultWriter::new(blocker).save("t", b"data");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
}

#[test]
fn task_ids_become_safe_file_names() {
    assert_eq!(result_filename("abc-123"), "translation_review_abc-123.txt");
    assert_eq!(result_filename("../etc/passwd"), "translation_review_etc_passwd.txt");
    assert_eq!(result_filename("a:b*c"), "translation_review_a_b_c.txt");
    assert_eq!(result_filename("  "), "translation_review_unknown.txt");

    let long = "x".repeat(200);
    assert_eq!(result_filename(&long), format!("translation_review_{}.txt", "x".repeat(80)));
}
