//! Column type inference and coercion.
//!
//! Inference turns the raw cells of one column into a typed [`Column`]:
//!
//! | non-null cells                  | nulls present | result    |
//! |---------------------------------|---------------|-----------|
//! | all integers                    | no            | `Int64`   |
//! | all integers                    | yes           | `Float64` |
//! | all numbers                     | any           | `Float64` |
//! | all booleans                    | any           | `Boolean` |
//! | none (every cell null)          | -             | `Float64` |
//! | anything else                   | any           | `Utf8`    |
//!
//! Text cells (CSV) are first tried as numbers and `true`/`false`. A column
//! with zero rows is `Utf8`.
//!
//! Coercion then casts a typed column to a requested [`DataType`], failing
//! with [`ShardError::TypeCoercion`] on the first value that does not fit.

use crate::error::{Result, ShardError};
use crate::frame::{Column, DataType, Value};
use ordered_float::OrderedFloat;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Infer the type of `cells` and build the column.
pub(crate) fn infer_column(name: String, cells: Vec<Value>, textual: bool) -> Column {
    if cells.is_empty() {
        return Column::new(name, DataType::Utf8, cells);
    }
    if cells.iter().all(Value::is_null) {
        return Column::new(name, DataType::Float64, cells);
    }
    let has_null = cells.iter().any(Value::is_null);

    if textual {
        infer_text(name, cells, has_null)
    } else {
        infer_typed(name, cells, has_null)
    }
}

fn infer_text(name: String, cells: Vec<Value>, has_null: bool) -> Column {
    let texts = || cells.iter().filter_map(Value::as_str);

    if texts().all(|s| s.trim().parse::<i64>().is_ok()) {
        let values = parse_all(&cells, |s| s.trim().parse::<i64>().ok().map(Value::Int));
        return widen_ints(name, values, has_null);
    }
    if texts().all(|s| s.trim().parse::<f64>().is_ok()) {
        let values = parse_all(&cells, |s| s.trim().parse::<f64>().ok().map(Value::from));
        return Column::new(name, DataType::Float64, values);
    }
    if texts().all(|s| parse_bool(s).is_some()) {
        let values = parse_all(&cells, |s| parse_bool(s).map(Value::Bool));
        return Column::new(name, DataType::Boolean, values);
    }
    Column::new(name, DataType::Utf8, cells)
}

fn infer_typed(name: String, cells: Vec<Value>, has_null: bool) -> Column {
    let non_null = || cells.iter().filter(|v| !v.is_null());

    if non_null().all(|v| matches!(v, Value::Int(_))) {
        return widen_ints(name, cells, has_null);
    }
    if non_null().all(|v| matches!(v, Value::Int(_) | Value::Float(_))) {
        let values = cells
            .into_iter()
            .map(|v| v.as_f64().map_or(Value::Null, Value::from))
            .collect();
        return Column::new(name, DataType::Float64, values);
    }
    if non_null().all(|v| matches!(v, Value::Bool(_))) {
        return Column::new(name, DataType::Boolean, cells);
    }
    if non_null().all(|v| matches!(v, Value::Str(_))) {
        return Column::new(name, DataType::Utf8, cells);
    }
    let values = cells.into_iter().map(render).collect();
    Column::new(name, DataType::Utf8, values)
}

/// Integers with missing values become floats, as NaN has no integer form.
fn widen_ints(name: String, values: Vec<Value>, has_null: bool) -> Column {
    if !has_null {
        return Column::new(name, DataType::Int64, values);
    }
    let values = values
        .into_iter()
        .map(|v| v.as_f64().map_or(Value::Null, Value::from))
        .collect();
    Column::new(name, DataType::Float64, values)
}

fn parse_all(cells: &[Value], parse: impl Fn(&str) -> Option<Value>) -> Vec<Value> {
    cells
        .iter()
        .map(|v| v.as_str().and_then(&parse).unwrap_or(Value::Null))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn render(v: Value) -> Value {
    match v {
        Value::Null => Value::Null,
        Value::Str(s) => Value::Str(s),
        other => Value::Str(other.to_string()),
    }
}

/// Cast `column` to `target`.
///
/// # Errors
/// `TypeCoercion` naming the column, the target type and the first row that
/// could not be converted.
pub(crate) fn coerce(column: Column, target: DataType) -> Result<Column> {
    if column.dtype == target {
        return Ok(column);
    }
    let Column { name, values, .. } = column;
    let mut out = Vec::with_capacity(values.len());
    for (row, v) in values.into_iter().enumerate() {
        match cast(v, target) {
            Ok(cast) => out.push(cast),
            Err(reason) => {
                return Err(ShardError::TypeCoercion {
                    column: name,
                    target,
                    reason: format!("row {row}: {reason}"),
                });
            }
        }
    }
    Ok(Column::new(name, target, out))
}

fn cast(v: Value, target: DataType) -> std::result::Result<Value, String> {
    match target {
        DataType::Float64 => to_float(v),
        DataType::Int64 => to_int(v),
        DataType::Boolean => to_bool(v),
        DataType::Utf8 => Ok(render(v)),
        DataType::Datetime => to_datetime(v),
    }
}

fn to_float(v: Value) -> std::result::Result<Value, String> {
    match v {
        Value::Null | Value::Float(_) => Ok(v),
        Value::Int(i) => Ok(Value::from(i as f64)),
        Value::Bool(b) => Ok(Value::from(if b { 1.0 } else { 0.0 })),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| format!("could not convert string to float: '{s}'")),
        Value::Datetime(_) => Err("datetime values have no float form".to_string()),
    }
}

fn to_int(v: Value) -> std::result::Result<Value, String> {
    match v {
        Value::Null => Err("cannot convert missing values to integer".to_string()),
        Value::Int(_) => Ok(v),
        Value::Float(OrderedFloat(x)) => {
            if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 {
                Ok(Value::Int(x as i64))
            } else {
                Err(format!("cannot safely cast {x} to integer"))
            }
        }
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("invalid literal for integer: '{s}'")),
        Value::Datetime(dt) => i64::try_from(dt.unix_timestamp_nanos())
            .map(Value::Int)
            .map_err(|_| format!("{dt} is out of the int64 nanosecond range")),
    }
}

fn to_bool(v: Value) -> std::result::Result<Value, String> {
    match v {
        Value::Null | Value::Bool(_) => Ok(v),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Float(OrderedFloat(x)) if x == 0.0 || x == 1.0 => Ok(Value::Bool(x == 1.0)),
        Value::Str(ref s) => parse_bool(s)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{s}' is not a boolean")),
        other => Err(format!("'{other}' is not a boolean")),
    }
}

fn to_datetime(v: Value) -> std::result::Result<Value, String> {
    match v {
        Value::Null | Value::Datetime(_) => Ok(v),
        Value::Int(ns) => OffsetDateTime::from_unix_timestamp_nanos(i128::from(ns))
            .map(Value::Datetime)
            .map_err(|e| e.to_string()),
        Value::Str(s) => parse_datetime(s.trim())
            .map(Value::Datetime)
            .ok_or_else(|| format!("'{s}' is not a recognised datetime")),
        other => Err(format!("'{other}' is not a datetime")),
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (or with `T`), or a bare date. Values
/// without an offset are taken as UTC.
fn parse_datetime(s: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let t_sep = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    for fmt in [spaced, t_sep] {
        if let Ok(dt) = PrimitiveDateTime::parse(s, fmt) {
            return Some(dt.assume_utc());
        }
    }
    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(s, date_only)
        .ok()
        .map(|d| d.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(cells: &[&str]) -> Vec<Value> {
        cells.iter().map(|s| crate::io::text_cell(s)).collect()
    }

    #[test]
    fn text_inference() {
        assert_eq!(infer_column("a".into(), text(&["1", "2"]), true).dtype, DataType::Int64);
        assert_eq!(infer_column("a".into(), text(&["1", ""]), true).dtype, DataType::Float64);
        assert_eq!(infer_column("a".into(), text(&["1", "2.5"]), true).dtype, DataType::Float64);
        assert_eq!(infer_column("a".into(), text(&["True", "false"]), true).dtype, DataType::Boolean);
        assert_eq!(infer_column("a".into(), text(&["x", "1"]), true).dtype, DataType::Utf8);
        assert_eq!(infer_column("a".into(), text(&["", ""]), true).dtype, DataType::Float64);
        assert_eq!(infer_column("a".into(), vec![], true).dtype, DataType::Utf8);
    }

    #[test]
    fn typed_inference_widens_numbers() {
        let col = infer_column("v".into(), vec![Value::Int(1), Value::from(0.5)], false);
        assert_eq!(col.dtype, DataType::Float64);
        assert_eq!(col.values, vec![Value::from(1.0), Value::from(0.5)]);

        let mixed = infer_column("v".into(), vec![Value::Int(1), Value::from("x")], false);
        assert_eq!(mixed.dtype, DataType::Utf8);
        assert_eq!(mixed.values[0], Value::from("1"));
    }

    #[test]
    fn int_to_float_and_back() {
        let col = Column::new("p", DataType::Int64, vec![Value::Int(3)]);
        let f = coerce(col, DataType::Float64).unwrap();
        assert_eq!(f.values, vec![Value::from(3.0)]);
        let i = coerce(f, DataType::Int64).unwrap();
        assert_eq!(i.values, vec![Value::Int(3)]);
    }

    #[test]
    fn failed_cast_names_column_and_row() {
        let col = Column::new("loc", DataType::Utf8, vec![Value::from("1"), Value::from("east")]);
        let err = coerce(col, DataType::Float64).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'loc'"), "{msg}");
        assert!(msg.contains("row 1"), "{msg}");
    }

    #[test]
    fn nulls_do_not_fit_int64() {
        let col = Column::new("x", DataType::Float64, vec![Value::Null]);
        assert!(coerce(col, DataType::Int64).is_err());
    }

    #[test]
    fn datetime_formats() {
        for s in ["2020-01-02T03:04:05Z", "2020-01-02 03:04:05", "2020-01-02"] {
            assert!(parse_datetime(s).is_some(), "{s}");
        }
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn floats_render_with_fraction() {
        let col = Column::new("x", DataType::Float64, vec![Value::from(1.0)]);
        let s = coerce(col, DataType::Utf8).unwrap();
        assert_eq!(s.values, vec![Value::from("1.0")]);
    }
}
