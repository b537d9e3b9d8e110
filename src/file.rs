// src/file.rs
//
// Table files on disk. Reads tolerate UTF-8 (with or without BOM) and
// Windows-1252; writes go to a temp file that is renamed into place, so a
// failed run never leaves a half-written output behind.

use std::{
    borrow::Cow,
    fs,
    io,
    path::{Path, PathBuf},
};

use crate::error::TableError;
use crate::table::Table;

pub fn read_table(path: &Path) -> Result<Table, TableError> {
    if !path.is_file() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| io_err(path, source))?;
    let text = decode_text(&bytes).ok_or_else(|| TableError::Encoding(path.to_path_buf()))?;
    let table = parse_table(&text).map_err(|source| csv_err(path, source))?;

    if table.headers.is_empty() || table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::Empty(path.to_path_buf()));
    }
    log::debug!("Read {} rows x {} columns from {}", table.len(), table.width(), path.display());
    Ok(table)
}

/// Parse CSV text with a header row. Ragged rows are reshaped to the header width.
pub fn parse_table(text: &str) -> Result<Table, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| s!(h.trim())).collect();
    let mut table = Table::new(headers);

    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(|c| s!(c)).collect());
    }
    if table.reshaped > 0 {
        log::warn!("{} row(s) did not match the header width and were padded/truncated", table.reshaped);
    }
    Ok(table)
}

/// UTF-8 first (BOM stripped), then Windows-1252.
pub fn decode_text(bytes: &[u8]) -> Option<Cow<'_, str>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some(Cow::Borrowed(s));
    }
    let (text, had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    if had_errors { None } else { Some(text) }
}

pub fn write_table(path: &Path, table: &Table) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent).map_err(|source| io_err(parent, source))?;
        }
    }

    let tmp = temp_path(path);
    {
        let mut w = csv::WriterBuilder::new()
            .flexible(false)
            .from_path(&tmp)
            .map_err(|source| csv_err(&tmp, source))?;
        w.write_record(&table.headers).map_err(|source| csv_err(&tmp, source))?;
        for row in &table.rows {
            w.write_record(row).map_err(|source| csv_err(&tmp, source))?;
        }
        w.flush().map_err(|source| io_err(&tmp, source))?;
    }
    fs::rename(&tmp, path).map_err(|source| io_err(path, source))?;

    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn io_err(path: &Path, source: io::Error) -> TableError {
    TableError::Io { path: path.to_path_buf(), source }
}

fn csv_err(path: &Path, source: csv::Error) -> TableError {
    TableError::Csv { path: path.to_path_buf(), source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_is_stripped() {
        let text = decode_text(b"\xEF\xBB\xBFusCite,docket\n").unwrap();
        assert!(text.starts_with("usCite"));
    }

    #[test]
    fn cp1252_fallback() {
        // 0xE9 = 'é' in Windows-1252, invalid as UTF-8
        let text = decode_text(b"caseName\nEx parte Cr\xE9\n").unwrap();
        assert!(text.contains("Ex parte Cré"));
    }

    #[test]
    fn parse_handles_quotes_and_ragged_rows() {
        let t = parse_table("a,b,c\n\"1,5\",\"say \"\"hi\"\"\",3\n4,5\n").unwrap();
        assert_eq!(t.headers, row!["a", "b", "c"]);
        assert_eq!(t.rows[0], row!["1,5", "say \"hi\"", "3"]);
        assert_eq!(t.rows[1], row!["4", "5", ""]);
        assert_eq!(t.reshaped, 1);
    }

    #[test]
    fn written_file_quotes_when_needed_and_leaves_no_temp() {
        let dir = std::env::temp_dir().join("scotus_file_write_quotes");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("out.csv");

        let mut t = Table::with_columns(&["title", "usCite"]);
        t.push_row(row!["Brown v. Board of Education, Topeka", "347 U.S. 483"]);
        write_table(&path, &t).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "title,usCite\n\"Brown v. Board of Education, Topeka\",347 U.S. 483\n");
        assert!(!temp_path(&path).exists());
    }
}
