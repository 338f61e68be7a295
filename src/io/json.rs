//! JSON records parsing primitive.
//!
//! Accepts newline-delimited JSON objects (one record per line, blank lines
//! skipped) or, when the content starts with `[`, a single array of objects.
//! Columns appear in the order their keys are first seen; records missing a
//! key get a null in that column.
//!
//! Cells keep their JSON types. Nested arrays and objects are stored as their
//! JSON text.

use crate::error::{Result, ShardError};
use crate::frame::Value;
use crate::io::RawTable;
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Parse JSON records from `reader`. `path` is only used in error messages.
///
/// # Errors
/// `Io` if the stream cannot be read; `Parse` on malformed JSON, non-object
/// records, or an input without records.
pub fn parse_json<R: Read>(mut reader: R, path: &Path) -> Result<RawTable> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| ShardError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut builder = RecordTable::default();
    if text.trim_start().starts_with('[') {
        let records: Vec<Json> = serde_json::from_str(&text)
            .map_err(|e| ShardError::parse(path, format!("parse JSON array: {e}")))?;
        for (i, rec) in records.into_iter().enumerate() {
            let Json::Object(obj) = rec else {
                return Err(ShardError::parse(path, format!("record {i} is not a JSON object")));
            };
            builder.push(obj);
        }
    } else {
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rec: Json = serde_json::from_str(line)
                .map_err(|e| ShardError::parse(path, format!("parse JSON line {}: {e}", i + 1)))?;
            let Json::Object(obj) = rec else {
                return Err(ShardError::parse(
                    path,
                    format!("JSON line {} is not an object", i + 1),
                ));
            };
            builder.push(obj);
        }
    }

    if builder.names.is_empty() {
        return Err(ShardError::parse(path, "No columns to parse from file"));
    }
    Ok(builder.finish())
}

#[derive(Default)]
struct RecordTable {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl RecordTable {
    fn push(&mut self, obj: Map<String, Json>) {
        for (key, value) in obj {
            let col = match self.positions.get(&key) {
                Some(&i) => i,
                None => {
                    let i = self.names.len();
                    self.positions.insert(key.clone(), i);
                    self.names.push(key);
                    self.columns.push(vec![Value::Null; self.rows]);
                    i
                }
            };
            self.columns[col].push(json_cell(value));
        }
        self.rows += 1;
        for col in &mut self.columns {
            if col.len() < self.rows {
                col.push(Value::Null);
            }
        }
    }

    fn finish(self) -> RawTable {
        RawTable {
            names: self.names,
            columns: self.columns,
            rows: self.rows,
            textual: false,
        }
    }
}

fn json_cell(value: Json) -> Value {
    match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::from),
        },
        Json::String(s) => Value::Str(s),
        nested @ (Json::Array(_) | Json::Object(_)) => Value::Str(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_with_missing_keys() {
        let text = "{\"a\": 1, \"b\": \"x\"}\n\n{\"b\": \"y\", \"c\": 2.5}\n";
        let t = parse_json(text.as_bytes(), Path::new("inline.json")).unwrap();
        assert_eq!(t.names, vec!["a", "b", "c"]);
        assert_eq!(t.rows, 2);
        assert_eq!(t.columns[0], vec![Value::Int(1), Value::Null]);
        assert_eq!(t.columns[2], vec![Value::Null, Value::from(2.5)]);
    }

    #[test]
    fn array_of_records() {
        let text = "[{\"a\": true}, {\"a\": false}]";
        let t = parse_json(text.as_bytes(), Path::new("inline.json")).unwrap();
        assert_eq!(t.columns[0], vec![Value::Bool(true), Value::Bool(false)]);
    }

    #[test]
    fn scalar_lines_are_rejected() {
        let err = parse_json("42\n".as_bytes(), Path::new("inline.json")).unwrap_err();
        assert!(err.to_string().contains("not an object"));
    }
}
