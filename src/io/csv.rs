//! Delimited-text parsing primitive.
//!
//! [`parse_csv`] reads one part file into a [`RawTable`] of text cells. It
//! only decides column names and row shape; typing, selection and indexing
//! happen later in the frame reader so that every partition goes through
//! the same steps.
//!
//! # Shape rules
//! - With [`HeaderPolicy::Infer`] the first record supplies the names;
//!   repeated names are suffixed (`x`, `x.1`).
//! - With [`HeaderPolicy::None`] the first record is data and the names are
//!   `"0".."k-1"`, `k` being that record's width.
//! - Short rows are padded with nulls; rows wider than the header are an
//!   error. Blank lines are skipped.
//! - A file without any record has no columns and fails to parse.

use crate::error::{Result, ShardError};
use crate::frame::Value;
use crate::io::{RawTable, dedupe_names, text_cell};
use crate::plan::HeaderPolicy;
use std::io::Read;
use std::path::Path;

/// Parse delimited text from `reader`. `path` is only used in error messages.
///
/// # Errors
/// `Parse` on malformed records, rows wider than the header, or an input
/// with no records at all.
pub fn parse_csv<R: Read>(
    reader: R,
    path: &Path,
    header: HeaderPolicy,
    delimiter: u8,
) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let mut records = rdr.records();

    let first = match records.next() {
        Some(rec) => rec.map_err(|e| ShardError::parse(path, e.to_string()))?,
        None => return Err(ShardError::parse(path, "No columns to parse from file")),
    };

    let width = first.len();
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); width];
    let mut rows = 0usize;
    let names = match header {
        HeaderPolicy::Infer => dedupe_names(first.iter().map(str::to_string).collect()),
        HeaderPolicy::None => {
            for (col, field) in columns.iter_mut().zip(first.iter()) {
                col.push(text_cell(field));
            }
            rows += 1;
            (0..width).map(|i| i.to_string()).collect()
        }
    };

    for rec in records {
        let rec = rec.map_err(|e| ShardError::parse(path, e.to_string()))?;
        if rec.len() > width {
            let line = rec.position().map_or(0, |p| p.line());
            return Err(ShardError::parse(
                path,
                format!("Expected {width} fields in line {line}, saw {}", rec.len()),
            ));
        }
        for (i, col) in columns.iter_mut().enumerate() {
            col.push(rec.get(i).map_or(Value::Null, text_cell));
        }
        rows += 1;
    }

    Ok(RawTable {
        names,
        columns,
        rows,
        textual: true,
    })
}
