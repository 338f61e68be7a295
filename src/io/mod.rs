//! File-system side of a load: locating part files and parsing one of them
//! into raw, untyped columns.

pub mod compression;
pub mod glob;
pub mod path;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod csv;

#[cfg_attr(docsrs, doc(cfg(feature = "io-json")))]
#[cfg(feature = "io-json")]
pub mod json;

use crate::frame::Value;

/// The output of a parsing primitive: named columns of cells whose types
/// have not been inferred yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    /// Column names in file order.
    pub names: Vec<String>,
    /// One cell vector per name, all of length `rows`.
    pub columns: Vec<Vec<Value>>,
    /// Number of data rows.
    pub rows: usize,
    /// `true` when every non-null cell is a `Value::Str` holding source text
    /// (CSV); `false` when cells already carry their own types (JSON).
    pub textual: bool,
}

/// Spellings treated as a missing value in delimited text.
const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Convert one text cell, mapping missing-value spellings to `Value::Null`.
pub(crate) fn text_cell(raw: &str) -> Value {
    if NA_VALUES.contains(&raw) {
        Value::Null
    } else {
        Value::Str(raw.to_string())
    }
}

/// Rename repeated names to `x`, `x.1`, `x.2`, ... keeping the first as is.
pub(crate) fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
            continue;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{name}.{n}");
            if !out.contains(&candidate) {
                out.push(candidate);
                break;
            }
            n += 1;
        }
    }
    out
}
