// tests/match_tables.rs
use std::fs;
use std::path::PathBuf;

use scotus_salience::config::MatchOptions;
use scotus_salience::error::MatchError;
use scotus_salience::file::read_table;
use scotus_salience::matcher;

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("scotus_match_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

const SCDB: &str = "\
caseId,usCite,docket,dateDecision,term,caseName
1973-016,410 U.S. 113,70-18,1/22/1973,1972,ROE v. WADE
1954-039,347 U.S. 483,1,5/17/1954,1953,BROWN v. BOARD OF EDUCATION
2020-001,,19-1392,,2020,PENDING CASE
";

const WIKI: &str = "\
title,usCite,docket,views_all_time,views_1yr,views_6mo,views_1mo
Brown v. Board of Education,347 U.S. 483,1,900,80,40,5
Dobbs-like case,,19\u{2013}1392,unavailable,unavailable,unavailable,unavailable
Essay page,,,0,0,0,0
Orphan v. Docket,,99-999,3,2,1,0
Roe v. Wade,410 U.S. 113,70-18,1050,50,50,20
";

fn setup(name: &str) -> MatchOptions {
    let dir = tmp_dir(name);
    fs::write(dir.join("SCDB_merged.csv"), SCDB).unwrap();
    fs::write(dir.join("wiki_infobox_cases.csv"), WIKI).unwrap();
    MatchOptions {
        scdb: dir.join("SCDB_merged.csv"),
        wiki: dir.join("wiki_infobox_cases.csv"),
        matched_out: dir.join("SCDB_with_infobox_views.csv"),
        unmatched_out: dir.join("unmatched_wiki_cases.csv"),
    }
}

#[test]
fn every_wiki_row_lands_in_exactly_one_output() {
    let opts = setup("partition");
    let summary = matcher::run(&opts).unwrap();

    assert_eq!(summary.wiki_rows, 5);
    assert_eq!(summary.by_citation, 2);
    assert_eq!(summary.by_docket, 1);
    assert_eq!(summary.unmatched, 2);
    assert!(summary.balanced());

    let matched = read_table(&opts.matched_out).unwrap();
    let unmatched = read_table(&opts.unmatched_out).unwrap();
    assert_eq!(matched.len() + unmatched.len(), 5);

    let title = matched.column("wiki_title").unwrap();
    let roe = matched.rows.iter().find(|r| r[title] == "Roe v. Wade").unwrap();
    assert_eq!(roe[0], "1973-016");
    let views = matched.column("views_all_time").unwrap();
    assert_eq!(roe[views], "1050");

    let dobbs = matched.rows.iter().find(|r| r[title] == "Dobbs-like case").unwrap();
    assert_eq!(dobbs[0], "2020-001");
    assert_eq!(dobbs[views], "unavailable");

    let unmatched_titles: Vec<&str> = unmatched.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(unmatched_titles, vec!["Essay page", "Orphan v. Docket"]);
    assert_eq!(unmatched.headers, read_table(&opts.wiki).unwrap().headers);
}

#[test]
fn matched_header_is_scdb_then_wiki_columns() {
    let opts = setup("header");
    matcher::run(&opts).unwrap();
    let matched = read_table(&opts.matched_out).unwrap();
    assert_eq!(
        matched.headers,
        vec![
            "caseId", "usCite", "docket", "dateDecision", "term", "caseName",
            "wiki_title", "wiki_usCite", "wiki_docket",
            "views_all_time", "views_1yr", "views_6mo", "views_1mo",
        ]
    );
}

#[test]
fn rerun_is_byte_identical() {
    let opts = setup("idempotent");
    matcher::run(&opts).unwrap();
    let first = (fs::read(&opts.matched_out).unwrap(), fs::read(&opts.unmatched_out).unwrap());
    matcher::run(&opts).unwrap();
    let second = (fs::read(&opts.matched_out).unwrap(), fs::read(&opts.unmatched_out).unwrap());
    assert_eq!(first, second);
}

#[test]
fn missing_key_columns_are_a_schema_error() {
    let opts = setup("schema");
    fs::write(&opts.wiki, "title,usCite,views_all_time\nRoe v. Wade,410 U.S. 113,1\n").unwrap();

    match matcher::run(&opts) {
        Err(MatchError::Schema { path, missing }) => {
            assert_eq!(path, opts.wiki);
            assert_eq!(missing, vec!["docket", "views_1yr", "views_6mo", "views_1mo"]);
        }
        other => panic!("expected Schema error, got {other:?}"),
    }
    assert!(!opts.matched_out.exists());
    assert!(!opts.unmatched_out.exists());
}
