//! Read options and the per-request [`OptionPlan`].
//!
//! Callers describe a load with [`ReadOptions`]. [`OptionPlan::build`]
//! validates what can be checked without touching a file and freezes the
//! result; the same plan is then applied to every partition of the request.
//! Checks that depend on a partition's header (`names` length, `usecols`
//! entries, `index_col`) are made by the frame reader on each partition.

use crate::error::{Result, ShardError};
use crate::frame::DataType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Input format of a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
}

/// Whether the first row of a part file names the columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// The first row holds column names.
    #[default]
    Infer,
    /// Every row is data; columns are named `"0".."k-1"`.
    None,
}

/// Column selection.
#[derive(Clone)]
pub enum UseCols {
    /// Keep the columns at these 0-based positions.
    ByPosition(Vec<usize>),
    /// Keep the columns with these names.
    ByName(Vec<String>),
    /// Keep the columns whose name satisfies the predicate.
    ByPredicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl fmt::Debug for UseCols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UseCols::ByPosition(p) => f.debug_tuple("ByPosition").field(p).finish(),
            UseCols::ByName(n) => f.debug_tuple("ByName").field(n).finish(),
            UseCols::ByPredicate(_) => f.write_str("ByPredicate(<fn>)"),
        }
    }
}

impl UseCols {
    /// Positions of the retained columns, in file order.
    ///
    /// # Errors
    /// `InvalidOption` if a position is out of range or a name is absent.
    pub fn select(&self, names: &[String]) -> Result<Vec<usize>> {
        match self {
            UseCols::ByPosition(positions) => {
                if let Some(bad) = positions.iter().find(|&&p| p >= names.len()) {
                    return Err(ShardError::InvalidOption(format!(
                        "usecols position {bad} is out of range for {} columns",
                        names.len()
                    )));
                }
                Ok((0..names.len()).filter(|i| positions.contains(i)).collect())
            }
            UseCols::ByName(wanted) => {
                let missing: Vec<&str> = wanted
                    .iter()
                    .filter(|w| !names.contains(*w))
                    .map(String::as_str)
                    .collect();
                if !missing.is_empty() {
                    return Err(ShardError::InvalidOption(format!(
                        "Usecols do not match columns, columns expected but not found: {missing:?}"
                    )));
                }
                Ok((0..names.len())
                    .filter(|&i| wanted.contains(&names[i]))
                    .collect())
            }
            UseCols::ByPredicate(keep) => Ok((0..names.len()).filter(|&i| keep(&names[i])).collect()),
        }
    }
}

/// Requested column types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DtypeSpec {
    /// One type for every retained column.
    Uniform(DataType),
    /// Types for named columns; others keep their inferred type.
    PerColumn(BTreeMap<String, DataType>),
}

impl DtypeSpec {
    #[must_use]
    pub fn target_for(&self, column: &str) -> Option<DataType> {
        match self {
            DtypeSpec::Uniform(t) => Some(*t),
            DtypeSpec::PerColumn(m) => m.get(column).copied(),
        }
    }
}

/// Column promoted to the row index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexCol {
    Name(String),
    /// Position among the retained columns.
    Position(usize),
}

/// Caller-facing options for a load, built fluently.
///
/// ```
/// use shardframe::{DataType, ReadOptions};
///
/// let opts = ReadOptions::new()
///     .usecols_names(["ID", "sale_price"])
///     .dtype_for("sale_price", DataType::Float64)
///     .index_col("ID");
/// # let _ = opts;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    pub header: HeaderPolicy,
    pub names: Option<Vec<String>>,
    pub usecols: Option<UseCols>,
    pub dtype: Option<DtypeSpec>,
    pub index_col: Option<IndexCol>,
    pub squeeze: bool,
    pub delimiter: Option<u8>,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn header(mut self, header: HeaderPolicy) -> Self {
        self.header = header;
        self
    }

    /// Column names to use instead of the parsed ones.
    ///
    /// With the default [`HeaderPolicy::Infer`] the first row is still read
    /// as the header and then replaced, so it never becomes data. Pass
    /// `header(HeaderPolicy::None)` for files that have no header row.
    #[must_use]
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn usecols_positions(mut self, positions: impl IntoIterator<Item = usize>) -> Self {
        self.usecols = Some(UseCols::ByPosition(positions.into_iter().collect()));
        self
    }

    #[must_use]
    pub fn usecols_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usecols = Some(UseCols::ByName(names.into_iter().map(Into::into).collect()));
        self
    }

    #[must_use]
    pub fn usecols_where<F>(mut self, keep: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.usecols = Some(UseCols::ByPredicate(Arc::new(keep)));
        self
    }

    /// Cast every retained column to `dtype`.
    #[must_use]
    pub fn dtype(mut self, dtype: DataType) -> Self {
        self.dtype = Some(DtypeSpec::Uniform(dtype));
        self
    }

    /// Cast `column` to `dtype`. Replaces a previous uniform dtype.
    #[must_use]
    pub fn dtype_for(mut self, column: impl Into<String>, dtype: DataType) -> Self {
        let mut map = match self.dtype.take() {
            Some(DtypeSpec::PerColumn(m)) => m,
            _ => BTreeMap::new(),
        };
        map.insert(column.into(), dtype);
        self.dtype = Some(DtypeSpec::PerColumn(map));
        self
    }

    #[must_use]
    pub fn index_col(mut self, name: impl Into<String>) -> Self {
        self.index_col = Some(IndexCol::Name(name.into()));
        self
    }

    #[must_use]
    pub fn index_col_at(mut self, position: usize) -> Self {
        self.index_col = Some(IndexCol::Position(position));
        self
    }

    #[must_use]
    pub fn squeeze(mut self, squeeze: bool) -> Self {
        self.squeeze = squeeze;
        self
    }

    /// Field separator for delimited text.
    #[must_use]
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Frozen, validated description of how to turn one part file into one
/// shard.
#[derive(Clone, Debug)]
pub struct OptionPlan {
    format: Format,
    header: HeaderPolicy,
    names: Option<Vec<String>>,
    usecols: Option<UseCols>,
    dtype: Option<DtypeSpec>,
    index_col: Option<IndexCol>,
    squeeze: bool,
    delimiter: u8,
}

impl OptionPlan {
    /// Validate `options` for `format`.
    ///
    /// # Errors
    /// `InvalidOption` on duplicate `names`, an empty `usecols` list, or a
    /// header policy / delimiter given for JSON input.
    pub fn build(format: Format, options: ReadOptions) -> Result<Self> {
        let ReadOptions {
            header,
            names,
            usecols,
            dtype,
            index_col,
            squeeze,
            delimiter,
        } = options;

        if let Some(names) = &names {
            for (i, n) in names.iter().enumerate() {
                if names[..i].contains(n) {
                    return Err(ShardError::InvalidOption(format!(
                        "Duplicate names are not allowed: '{n}'"
                    )));
                }
            }
        }

        match &usecols {
            Some(UseCols::ByPosition(p)) if p.is_empty() => {
                return Err(ShardError::InvalidOption("usecols must not be empty".into()));
            }
            Some(UseCols::ByName(n)) if n.is_empty() => {
                return Err(ShardError::InvalidOption("usecols must not be empty".into()));
            }
            _ => {}
        }

        if format == Format::Json {
            if header != HeaderPolicy::Infer {
                return Err(ShardError::InvalidOption(
                    "header does not apply to JSON records".into(),
                ));
            }
            if delimiter.is_some() {
                return Err(ShardError::InvalidOption(
                    "delimiter does not apply to JSON records".into(),
                ));
            }
        }

        Ok(Self {
            format,
            header,
            names,
            usecols,
            dtype,
            index_col,
            squeeze,
            delimiter: delimiter.unwrap_or(b','),
        })
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    #[must_use]
    pub fn header(&self) -> HeaderPolicy {
        self.header
    }

    #[must_use]
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    #[must_use]
    pub fn usecols(&self) -> Option<&UseCols> {
        self.usecols.as_ref()
    }

    #[must_use]
    pub fn dtype(&self) -> Option<&DtypeSpec> {
        self.dtype.as_ref()
    }

    #[must_use]
    pub fn index_col(&self) -> Option<&IndexCol> {
        self.index_col.as_ref()
    }

    #[must_use]
    pub fn squeeze(&self) -> bool {
        self.squeeze
    }

    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positions_keep_file_order() {
        let cols = names(&["ID", "sale_price", "location"]);
        let sel = UseCols::ByPosition(vec![2, 0]).select(&cols).unwrap();
        assert_eq!(sel, vec![0, 2]);
    }

    #[test]
    fn names_keep_file_order() {
        let cols = names(&["ID", "sale_price", "location"]);
        let sel = UseCols::ByName(names(&["location", "ID"])).select(&cols).unwrap();
        assert_eq!(sel, vec![0, 2]);
    }

    #[test]
    fn absent_entries_are_rejected() {
        let cols = names(&["ID"]);
        assert!(UseCols::ByPosition(vec![3]).select(&cols).is_err());
        let err = UseCols::ByName(names(&["price"])).select(&cols).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn dtype_for_replaces_uniform() {
        let opts = ReadOptions::new()
            .dtype(DataType::Float64)
            .dtype_for("ID", DataType::Utf8);
        let dtype = opts.dtype.unwrap();
        assert_eq!(dtype.target_for("ID"), Some(DataType::Utf8));
        assert_eq!(dtype.target_for("other"), None);
    }
}
