//! Reading one part file into one [`Shard`].
//!
//! [`read_part`] applies an [`OptionPlan`] in a fixed order:
//!
//! 1. parse the file (header row or positional names),
//! 2. replace names with `plan.names`,
//! 3. keep the columns selected by `plan.usecols`,
//! 4. infer column types, then cast with `plan.dtype`,
//! 5. promote `plan.index_col` to the row index,
//! 6. squeeze a single remaining column into a [`Series`].
//!
//! The function touches no shared state, so partitions can be read
//! concurrently in any order.

use crate::dtype::{coerce, infer_column};
use crate::error::{Result, ShardError};
use crate::frame::{Column, Frame, Index, Series, Shard};
use crate::io::RawTable;
use crate::io::compression::open_part;
use crate::io::path::PartFile;
use crate::plan::{DtypeSpec, Format, IndexCol, OptionPlan};

/// Read `part` according to `plan`.
///
/// # Errors
/// `Io`/`Parse` from the file, `InvalidOption` when the plan does not fit
/// the partition's columns, `TypeCoercion` when a cast fails.
pub fn read_part(part: &PartFile, plan: &OptionPlan) -> Result<Shard> {
    let span = tracing::debug_span!("read_part", key = part.key, path = %part.path.display());
    let _enter = span.enter();

    let RawTable {
        mut names,
        mut columns,
        rows,
        textual,
    } = parse_part(part, plan)?;

    if let Some(explicit) = plan.names() {
        if explicit.len() != names.len() {
            return Err(ShardError::InvalidOption(format!(
                "names has {} entries but {} has {} columns",
                explicit.len(),
                part.path.display(),
                names.len()
            )));
        }
        names = explicit.to_vec();
    }

    let keep: Vec<usize> = match plan.usecols() {
        Some(usecols) => usecols.select(&names)?,
        None => (0..names.len()).collect(),
    };

    let mut typed = Vec::with_capacity(keep.len());
    for i in keep {
        let cells = std::mem::take(&mut columns[i]);
        let column = infer_column(names[i].clone(), cells, textual);
        let column = match plan.dtype().and_then(|d| d.target_for(&column.name)) {
            Some(target) => coerce(column, target)?,
            None => column,
        };
        typed.push(column);
    }
    if let Some(DtypeSpec::PerColumn(map)) = plan.dtype() {
        for name in map.keys().filter(|k| !typed.iter().any(|c| &c.name == *k)) {
            tracing::debug!(column = %name, "dtype given for a column that is not loaded");
        }
    }

    let (columns, index) = match plan.index_col() {
        Some(index_col) => promote_index(typed, index_col)?,
        None => (typed, Index::Range(rows)),
    };

    let shard = if plan.squeeze() && columns.len() == 1 {
        let column = columns.into_iter().next().ok_or_else(|| {
            ShardError::InvalidOption("squeeze found no column to keep".into())
        })?;
        Shard::Series(Series::new(column, index))
    } else {
        Shard::Frame(Frame::with_index(columns, index))
    };
    tracing::debug!(rows, series = shard.is_series(), "partition read");
    Ok(shard)
}

fn parse_part(part: &PartFile, plan: &OptionPlan) -> Result<RawTable> {
    let reader = open_part(&part.path).map_err(|source| ShardError::Io {
        path: part.path.clone(),
        source,
    })?;
    match plan.format() {
        #[cfg(feature = "io-csv")]
        Format::Csv => {
            crate::io::csv::parse_csv(reader, &part.path, plan.header(), plan.delimiter())
        }
        #[cfg(feature = "io-json")]
        Format::Json => crate::io::json::parse_json(reader, &part.path),
        #[allow(unreachable_patterns)]
        other => Err(ShardError::InvalidOption(format!(
            "{other:?} support is not compiled into this build"
        ))),
    }
}

fn promote_index(mut columns: Vec<Column>, index_col: &IndexCol) -> Result<(Vec<Column>, Index)> {
    let pos = match index_col {
        IndexCol::Name(name) => columns.iter().position(|c| &c.name == name).ok_or_else(|| {
            ShardError::InvalidOption(format!("Index {name} invalid: no such column"))
        })?,
        IndexCol::Position(p) if *p < columns.len() => *p,
        IndexCol::Position(p) => {
            return Err(ShardError::InvalidOption(format!(
                "index_col position {p} is out of range for {} columns",
                columns.len()
            )));
        }
    };
    let column = columns.remove(pos);
    let index = Index::Labels {
        name: column.name,
        values: column.values,
    };
    Ok((columns, index))
}
