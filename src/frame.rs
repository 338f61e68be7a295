//! In-memory tabular results: [`Frame`], [`Series`] and the [`Shard`] that
//! holds one of them per partition.
//!
//! Cells are stored as [`Value`]s grouped into typed [`Column`]s. Each result
//! carries an [`Index`]: either the default 0-based positional range, or the
//! labels of a promoted `index_col`.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Scalar semantic type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "float64")]
    Float64,
    #[serde(rename = "bool")]
    Boolean,
    #[serde(rename = "str")]
    Utf8,
    #[serde(rename = "datetime64")]
    Datetime,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Boolean => "bool",
            DataType::Utf8 => "str",
            DataType::Datetime => "datetime64",
        };
        f.write_str(s)
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Accepts the usual dataframe aliases (`"float"`, `"int64"`, `"object"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "int64" | "integer" | "i64" => Ok(DataType::Int64),
            "float" | "float64" | "double" | "f64" => Ok(DataType::Float64),
            "bool" | "boolean" => Ok(DataType::Boolean),
            "str" | "string" | "object" | "utf8" => Ok(DataType::Utf8),
            "datetime" | "datetime64" | "datetime64[ns]" | "timestamp" => Ok(DataType::Datetime),
            other => Err(format!("unknown dtype '{other}'")),
        }
    }
}

/// A single cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Datetime(OffsetDateTime),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.0),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NaN"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{:?}", x.0),
            Value::Str(s) => f.write_str(s),
            Value::Datetime(dt) => {
                let s = dt.format(&Rfc3339).map_err(|_| fmt::Error)?;
                f.write_str(&s)
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Value::Datetime(v)
    }
}

/// A named, typed column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
    pub values: Vec<Value>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, dtype: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Row labels of a frame or series.
#[derive(Clone, Debug, PartialEq)]
pub enum Index {
    /// Default positional labels `0..n`.
    Range(usize),
    /// Labels taken from a promoted column.
    Labels { name: String, values: Vec<Value> },
}

impl Index {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Index::Range(n) => *n,
            Index::Labels { values, .. } => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the promoted column, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Index::Range(_) => None,
            Index::Labels { name, .. } => Some(name),
        }
    }

    /// Row position of `key`, if it is a label of this index.
    ///
    /// Integer and float labels compare by numeric value, so `100529`
    /// finds a label that was cast to `100529.0`.
    #[must_use]
    pub fn position(&self, key: &Value) -> Option<usize> {
        match self {
            Index::Range(n) => match key {
                Value::Int(i) if *i >= 0 && (*i as usize) < *n => Some(*i as usize),
                Value::Float(x) if x.0.fract() == 0.0 && x.0 >= 0.0 && x.0 < *n as f64 => {
                    Some(x.0 as usize)
                }
                _ => None,
            },
            Index::Labels { values, .. } => values.iter().position(|v| same_label(v, key)),
        }
    }

    /// Whether `key` is a label of this index.
    ///
    /// ```
    /// use shardframe::frame::{Index, Value};
    ///
    /// let idx = Index::Labels { name: "ID".into(), values: vec![Value::Int(100529)] };
    /// assert!(idx.contains(100529));
    /// assert!(!Index::Range(3).contains(3));
    /// ```
    pub fn contains(&self, key: impl Into<Value>) -> bool {
        self.position(&key.into()).is_some()
    }
}

fn same_label(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(i), Value::Float(x)) | (Value::Float(x), Value::Int(i)) => *i as f64 == x.0,
        _ => a == b,
    }
}

/// A rectangular table of named columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    index: Index,
}

impl Frame {
    /// Build a frame with the default positional index.
    ///
    /// All columns must have the same length.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        let rows = columns.first().map_or(0, Column::len);
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Self {
            columns,
            index: Index::Range(rows),
        }
    }

    pub(crate) fn with_index(columns: Vec<Column>, index: Index) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == index.len()));
        Self { columns, index }
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn dtype(&self, name: &str) -> Option<DataType> {
        self.column(name).map(|c| c.dtype)
    }

    /// `(name, dtype)` pairs in column order.
    #[must_use]
    pub fn dtypes(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.dtype))
            .collect()
    }

    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// The row labelled `key`, as `(column, value)` pairs.
    #[must_use]
    pub fn loc(&self, key: &Value) -> Option<Vec<(&str, &Value)>> {
        let row = self.index.position(key)?;
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.as_str(), &c.values[row]))
                .collect(),
        )
    }
}

/// A one-dimensional named column with an index.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    column: Column,
    index: Index,
}

impl Series {
    pub(crate) fn new(column: Column, index: Index) -> Self {
        debug_assert_eq!(column.len(), index.len());
        Self { column, index }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.column.name
    }

    #[must_use]
    pub fn dtype(&self) -> DataType {
        self.column.dtype
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.column.values
    }

    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.column.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }

    /// Value at the row labelled `key`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.index.position(key).map(|i| &self.column.values[i])
    }
}

/// The materialized result of one partition.
#[derive(Clone, Debug, PartialEq)]
pub enum Shard {
    Frame(Frame),
    Series(Series),
}

impl Shard {
    #[must_use]
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Shard::Frame(f) => Some(f),
            Shard::Series(_) => None,
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Shard::Series(s) => Some(s),
            Shard::Frame(_) => None,
        }
    }

    #[must_use]
    pub fn is_series(&self) -> bool {
        matches!(self, Shard::Series(_))
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        match self {
            Shard::Frame(f) => f.num_rows(),
            Shard::Series(s) => s.len(),
        }
    }

    #[must_use]
    pub fn index(&self) -> &Index {
        match self {
            Shard::Frame(f) => f.index(),
            Shard::Series(s) => s.index(),
        }
    }

    /// Column names; a series reports its own name.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        match self {
            Shard::Frame(f) => f.columns(),
            Shard::Series(s) => vec![s.name()],
        }
    }

    /// `(name, dtype)` pairs; a series reports a single pair.
    #[must_use]
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        match self {
            Shard::Frame(f) => f.dtypes(),
            Shard::Series(s) => vec![(s.name(), s.dtype())],
        }
    }
}
