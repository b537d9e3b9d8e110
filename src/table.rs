// src/table.rs
//
// In-memory delimited table: one header row plus string cells.
// Every stage reads and writes these; empty cell = null.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows `push_row` had to pad or truncate.
    pub reshaped: usize,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new(), reshaped: 0 }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| s!(*c)).collect())
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn width(&self) -> usize { self.headers.len() }

    /// Index of the first header equal to `name` (exact, after trimming).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Names from `required` that are not headers of this table.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| s!(*c))
            .collect()
    }

    /// Append a row, padded or truncated to the header width.
    /// Returns false if the row had to be reshaped.
    pub fn push_row(&mut self, mut row: Vec<String>) -> bool {
        let width = self.width();
        let fits = row.len() == width;
        if !fits {
            self.reshaped += 1;
        }
        row.resize(width, s!());
        self.rows.push(row);
        fits
    }
}

/// Cell text for an optional column; missing column or short row → "".
pub fn cell(row: &[String], col: Option<usize>) -> &str {
    col.and_then(|c| row.get(c)).map(|s| s.as_str()).unwrap_or("")
}
