// src/matcher.rs
//
// Stage 3: join SCDB cases with wiki case pages.
// Citation key first, docket key as fallback. Each wiki row ends up in
// exactly one of the two outputs; each SCDB row is claimed at most once.

use std::collections::HashMap;
use std::path::Path;

use crate::config::MatchOptions;
use crate::config::consts::*;
use crate::error::MatchError;
use crate::file::{read_table, write_table};
use crate::keys::{citation_key, decision_year, docket_key, wiki_year};
use crate::table::{Table, cell};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub wiki_rows: usize,
    pub by_citation: usize,
    pub by_docket: usize,
    pub unmatched: usize,
    /// Wiki rows whose key pointed at more than one SCDB row.
    pub ambiguous: usize,
}

impl MatchSummary {
    pub fn matched(&self) -> usize {
        self.by_citation + self.by_docket
    }

    /// matched + unmatched == wiki rows
    pub fn balanced(&self) -> bool {
        self.matched() + self.unmatched == self.wiki_rows
    }
}

pub fn run(opts: &MatchOptions) -> Result<MatchSummary, MatchError> {
    log::info!("Loading SCDB from {}", opts.scdb.display());
    let scdb = read_table(&opts.scdb)?;
    log::info!("Loading wiki cases from {}", opts.wiki.display());
    let wiki = read_table(&opts.wiki)?;

    require(&scdb, &opts.scdb, &[SCDB_CITE_COL, SCDB_DOCKET_COL])?;
    require(&wiki, &opts.wiki, &WIKI_COLUMNS)?;

    let (matched, unmatched, summary) = match_tables(&scdb, &wiki);
    write_table(&opts.matched_out, &matched)?;
    write_table(&opts.unmatched_out, &unmatched)?;

    log::info!(
        "Wiki rows: {}; matched {} ({} by citation, {} by docket); unmatched {}; ambiguous keys {}",
        summary.wiki_rows,
        summary.matched(),
        summary.by_citation,
        summary.by_docket,
        summary.unmatched,
        summary.ambiguous
    );
    if !summary.balanced() {
        log::error!(
            "Row counts do not add up: {} matched + {} unmatched != {} wiki rows",
            summary.matched(),
            summary.unmatched,
            summary.wiki_rows
        );
    }
    Ok(summary)
}

fn require(table: &Table, path: &Path, columns: &[&str]) -> Result<(), MatchError> {
    let missing = table.missing_columns(columns);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MatchError::Schema { path: path.to_path_buf(), missing })
    }
}

struct ScdbIndex {
    by_cite: HashMap<String, Vec<usize>>,
    by_docket: HashMap<String, Vec<usize>>,
    years: Vec<Option<i32>>,
}

impl ScdbIndex {
    fn build(scdb: &Table) -> Self {
        let cite_col = scdb.column(SCDB_CITE_COL);
        let docket_col = scdb.column(SCDB_DOCKET_COL);
        let date_col = scdb.column(SCDB_DATE_COL);
        let term_col = scdb.column(SCDB_TERM_COL);

        let mut by_cite: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_docket: HashMap<String, Vec<usize>> = HashMap::new();
        let mut years = Vec::with_capacity(scdb.len());

        for (i, row) in scdb.rows.iter().enumerate() {
            if let Some(k) = citation_key(cell(row, cite_col)) {
                by_cite.entry(k).or_default().push(i);
            }
            if let Some(k) = docket_key(cell(row, docket_col)) {
                by_docket.entry(k).or_default().push(i);
            }
            years.push(decision_year(cell(row, date_col), cell(row, term_col)));
        }
        Self { by_cite, by_docket, years }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MatchedBy {
    Citation,
    Docket,
}

/// Pure join. Returns (matched, unmatched, summary).
pub fn match_tables(scdb: &Table, wiki: &Table) -> (Table, Table, MatchSummary) {
    let index = ScdbIndex::build(scdb);
    let mut claimed = vec![false; scdb.len()];

    let title_col = wiki.column("title");
    let cite_col = wiki.column("usCite");
    let docket_col = wiki.column("docket");
    let view_cols: Vec<Option<usize>> = VIEW_COLUMNS.iter().map(|c| wiki.column(c)).collect();

    let mut matched_headers = scdb.headers.clone();
    matched_headers.extend([s!("wiki_title"), s!("wiki_usCite"), s!("wiki_docket")]);
    matched_headers.extend(VIEW_COLUMNS.iter().map(|c| s!(*c)));
    let mut matched = Table::new(matched_headers);
    let mut unmatched = Table::new(wiki.headers.clone());

    let mut summary = MatchSummary { wiki_rows: wiki.len(), ..MatchSummary::default() };

    for w in &wiki.rows {
        let title = cell(w, title_col);
        let raw_cite = cell(w, cite_col);
        let raw_docket = cell(w, docket_col);

        let mut chosen: Option<(usize, MatchedBy)> = None;
        let mut ambiguous = false;

        if let Some(cands) = citation_key(raw_cite).and_then(|k| index.by_cite.get(&k)) {
            ambiguous |= cands.len() > 1;
            chosen = first_unclaimed(cands.iter().copied(), &claimed).map(|i| (i, MatchedBy::Citation));
        }

        if chosen.is_none() {
            if let Some(cands) = docket_key(raw_docket).and_then(|k| index.by_docket.get(&k)) {
                ambiguous |= cands.len() > 1;
                let order = prefer_year(cands, &index.years, wiki_year(title, raw_cite));
                chosen = first_unclaimed(order.into_iter(), &claimed).map(|i| (i, MatchedBy::Docket));
            }
        }

        if ambiguous {
            summary.ambiguous += 1;
            log::warn!("'{title}': key matches more than one SCDB row; taking the first unclaimed");
        }

        match chosen {
            Some((i, by)) => {
                claimed[i] = true;
                match by {
                    MatchedBy::Citation => summary.by_citation += 1,
                    MatchedBy::Docket => summary.by_docket += 1,
                }
                let mut row = scdb.rows[i].clone();
                row.resize(scdb.width(), s!());
                row.extend([s!(title), s!(raw_cite), s!(raw_docket)]);
                row.extend(view_cols.iter().map(|c| s!(cell(w, *c))));
                matched.rows.push(row);
            }
            None => {
                summary.unmatched += 1;
                log::debug!("Unmatched: '{title}'");
                unmatched.push_row(w.clone());
            }
        }
    }

    (matched, unmatched, summary)
}

fn first_unclaimed(mut cands: impl Iterator<Item = usize>, claimed: &[bool]) -> Option<usize> {
    cands.find(|&i| !claimed[i])
}

/// Candidates whose decision year equals `year` first, file order otherwise.
fn prefer_year(cands: &[usize], years: &[Option<i32>], year: Option<i32>) -> Vec<usize> {
    let Some(year) = year else {
        return cands.to_vec();
    };
    let (mut same, other): (Vec<usize>, Vec<usize>) =
        cands.iter().partition(|&&i| years[i] == Some(year));
    same.extend(other);
    same
}
