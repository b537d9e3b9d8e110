// src/merge.rs
//
// Stage 1: SCDB Legacy + Modern → one table.
// Outer union of columns (legacy order first, then modern-only columns),
// rows concatenated legacy-then-modern, no de-duplication: the two eras
// cover disjoint terms.

use std::collections::HashMap;
use std::path::Path;

use crate::config::MergeOptions;
use crate::error::MergeError;
use crate::file::{read_table, write_table};
use crate::table::Table;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub legacy_rows: usize,
    pub modern_rows: usize,
    pub merged_rows: usize,
    pub columns: usize,
    /// Input rows padded or truncated to their file's header width.
    pub ragged_rows: usize,
    pub legacy_only: Vec<String>,
    pub modern_only: Vec<String>,
}

pub fn run(opts: &MergeOptions) -> Result<MergeSummary, MergeError> {
    log::info!("Loading Legacy SCDB from {}", opts.legacy.display());
    let legacy = read_table(&opts.legacy)?;
    log::info!("Loading Modern SCDB from {}", opts.modern.display());
    let modern = read_table(&opts.modern)?;

    let keys: Vec<&str> = opts.key_columns.iter().map(|k| k.as_str()).collect();
    require_columns(&legacy, &opts.legacy, &keys)?;
    require_columns(&modern, &opts.modern, &keys)?;

    let (merged, summary) = merge_tables(&legacy, &modern);
    write_table(&opts.out, &merged)?;

    log::info!(
        "Merged {} legacy + {} modern rows into {} ({} columns)",
        summary.legacy_rows, summary.modern_rows, summary.merged_rows, summary.columns
    );
    if summary.ragged_rows > 0 {
        log::warn!("{} input row(s) were padded or truncated to their header width", summary.ragged_rows);
    }
    if !summary.legacy_only.is_empty() {
        log::info!("Legacy-only columns: {}", summary.legacy_only.join(", "));
    }
    if !summary.modern_only.is_empty() {
        log::info!("Modern-only columns: {}", summary.modern_only.join(", "));
    }
    Ok(summary)
}

fn require_columns(table: &Table, path: &Path, required: &[&str]) -> Result<(), MergeError> {
    match table.missing_columns(required).into_iter().next() {
        Some(column) => Err(MergeError::MalformedInput { path: path.to_path_buf(), column }),
        None => Ok(()),
    }
}

/// Pure merge. Cells a source does not have stay empty.
pub fn merge_tables(legacy: &Table, modern: &Table) -> (Table, MergeSummary) {
    let mut headers: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for h in legacy.headers.iter().chain(modern.headers.iter()) {
        if !index.contains_key(h) {
            index.insert(h.clone(), headers.len());
            headers.push(h.clone());
        }
    }

    let legacy_only = only_in(legacy, modern);
    let modern_only = only_in(modern, legacy);

    let mut merged = Table::new(headers);
    merged.rows.reserve(legacy.len() + modern.len());
    for source in [legacy, modern] {
        let map = column_map(source, &index);
        for row in &source.rows {
            let mut out = vec![s!(); merged.width()];
            for (i, cell) in row.iter().enumerate() {
                if let Some(Some(dst)) = map.get(i) {
                    out[*dst] = cell.clone();
                }
            }
            merged.rows.push(out);
        }
    }

    let summary = MergeSummary {
        legacy_rows: legacy.len(),
        modern_rows: modern.len(),
        merged_rows: merged.len(),
        columns: merged.width(),
        ragged_rows: legacy.reshaped + modern.reshaped,
        legacy_only,
        modern_only,
    };
    (merged, summary)
}

/// Source column → merged column. A repeated header name inside one
/// source keeps its first occurrence only.
fn column_map(source: &Table, index: &HashMap<String, usize>) -> Vec<Option<usize>> {
    let mut seen: Vec<usize> = Vec::with_capacity(source.width());
    source
        .headers
        .iter()
        .map(|h| {
            let dst = index.get(h).copied()?;
            if seen.contains(&dst) {
                log::warn!("Duplicate column '{h}' in source; keeping the first one");
                return None;
            }
            seen.push(dst);
            Some(dst)
        })
        .collect()
}

fn only_in(a: &Table, b: &Table) -> Vec<String> {
    a.headers.iter().filter(|h| b.column(h).is_none()).cloned().collect()
}
