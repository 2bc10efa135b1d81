// ─────────────────────────────────────────────────────────────────────
// DivH Retention — Delimited Table Reader
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Numeric text tables with a named header row.
//!
//! The first non-blank line is the header; a leading `#` is stripped.
//! Blank lines are skipped. Empty cells and `nan` (any case) read as NaN.

use std::path::Path;

use divh_types::error::{RetentionError, RetentionResult};
use ndarray::Array1;

#[derive(Debug, Clone)]
pub struct DelimitedTable {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<Vec<f64>>,
}

fn parse_cell(cell: &str, source_name: &str, line: usize) -> RetentionResult<f64> {
    let cell = cell.trim().trim_matches('"');
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|e| RetentionError::Parse {
        source_name: source_name.to_string(),
        line,
        message: format!("cannot parse '{cell}' as float: {e}"),
    })
}

impl DelimitedTable {
    pub fn parse(text: &str, delimiter: char, source_name: &str) -> RetentionResult<Self> {
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(n_cols) = headers.as_ref().map(Vec::len) else {
                let header = line.strip_prefix('#').unwrap_or(line);
                headers = Some(
                    header
                        .split(delimiter)
                        .map(|h| h.trim().trim_matches('"').to_string())
                        .collect(),
                );
                continue;
            };

            let row = line
                .split(delimiter)
                .map(|cell| parse_cell(cell, source_name, line_no))
                .collect::<RetentionResult<Vec<f64>>>()?;
            if row.len() != n_cols {
                return Err(RetentionError::Parse {
                    source_name: source_name.to_string(),
                    line: line_no,
                    message: format!("expected {n_cols} columns, found {}", row.len()),
                });
            }
            rows.push(row);
        }

        let headers = headers.ok_or_else(|| RetentionError::Parse {
            source_name: source_name.to_string(),
            line: 0,
            message: "missing header row".to_string(),
        })?;
        Ok(DelimitedTable {
            source_name: source_name.to_string(),
            headers,
            rows,
        })
    }

    pub fn read(path: &Path, delimiter: char) -> RetentionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, delimiter, &path.display().to_string())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Column by header name, or a parse error naming the missing column.
    pub fn column(&self, name: &str) -> RetentionResult<Array1<f64>> {
        self.optional_column(name)
            .ok_or_else(|| RetentionError::Parse {
                source_name: self.source_name.clone(),
                line: 1,
                message: format!("missing column '{name}'"),
            })
    }

    pub fn optional_column(&self, name: &str) -> Option<Array1<f64>> {
        self.index_of(name).map(|i| self.column_at(i))
    }

    pub fn column_at(&self, index: usize) -> Array1<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }
}
