// tests/merge_tables.rs
use std::fs;
use std::path::PathBuf;

use scotus_salience::config::MergeOptions;
use scotus_salience::error::{MergeError, TableError};
use scotus_salience::file::read_table;
use scotus_salience::merge;

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("scotus_merge_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

#[test]
fn merges_cp1252_legacy_with_utf8_modern() {
    let dir = tmp_dir("encodings");
    let legacy = dir.join("legacy.csv");
    let modern = dir.join("modern.csv");

    // "Worcester v. Georgia" with an é (0xE9) in CP1252
    let mut legacy_bytes = b"caseId,usCite,caseName,lawSupp\n1832-010,31 U.S. 515,Caf".to_vec();
    legacy_bytes.push(0xE9);
    legacy_bytes.extend_from_slice(b" v. Georgia,9\n");
    fs::write(&legacy, legacy_bytes).unwrap();
    fs::write(
        &modern,
        "\u{feff}caseId,caseName,usCite,adminAction\n1973-016,Roe v. Wade,410 U.S. 113,\n",
    )
    .unwrap();

    let mut opts = MergeOptions::new(&legacy, &modern);
    opts.out = dir.join("SCDB_merged.csv");
    let summary = merge::run(&opts).unwrap();
    assert_eq!((summary.legacy_rows, summary.modern_rows, summary.merged_rows), (1, 1, 2));

    let merged = read_table(&opts.out).unwrap();
    assert_eq!(merged.headers, vec!["caseId", "usCite", "caseName", "lawSupp", "adminAction"]);
    assert_eq!(merged.rows[0][2], "Caf\u{e9} v. Georgia");
    assert_eq!(merged.rows[1], vec!["1973-016", "410 U.S. 113", "Roe v. Wade", "", ""]);
}

#[test]
fn missing_key_column_is_malformed_input() {
    let dir = tmp_dir("missing_key");
    let legacy = dir.join("legacy.csv");
    let modern = dir.join("modern.csv");
    fs::write(&legacy, "caseId,usCite\n1,2 U.S. 1\n").unwrap();
    fs::write(&modern, "caseId,cite\n2,329 U.S. 1\n").unwrap();

    let mut opts = MergeOptions::new(&legacy, &modern);
    opts.out = dir.join("out.csv");
    match merge::run(&opts) {
        Err(MergeError::MalformedInput { path, column }) => {
            assert_eq!(path, modern);
            assert_eq!(column, "usCite");
        }
        other => panic!("expected MalformedInput, got {other:?}"),
    }
    assert!(!opts.out.exists());
}

#[test]
fn missing_file_is_not_found() {
    let dir = tmp_dir("not_found");
    let modern = dir.join("modern.csv");
    fs::write(&modern, "usCite\n329 U.S. 1\n").unwrap();

    let mut opts = MergeOptions::new(dir.join("nope.csv"), &modern);
    opts.out = dir.join("out.csv");
    assert!(matches!(merge::run(&opts), Err(MergeError::Table(TableError::NotFound(_)))));
}
