//! Row-built tables as polars frames, and the frame operations the silver
//! layer shares.

use super::{Table, Value};
use crate::error::{LakeError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;

/// Physical type chosen for a column when building a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Bool,
    Int,
    Float,
    Date,
    Timestamp,
    Str,
}

/// Pick the narrowest kind that holds every non-null value of a column.
pub(crate) fn infer_kind<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Int(_) => ColumnKind::Int,
            Value::Float(_) => ColumnKind::Float,
            Value::Str(_) => ColumnKind::Str,
            Value::Date(_) => ColumnKind::Date,
            Value::Timestamp(_) => ColumnKind::Timestamp,
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Int), ColumnKind::Float) | (Some(ColumnKind::Float), ColumnKind::Int) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Str,
        });
    }
    kind.unwrap_or(ColumnKind::Str)
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn days_since_epoch(date: &NaiveDate) -> i32 {
    (*date - epoch()).num_days() as i32
}

fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, None)
}

fn build_series(name: &str, kind: ColumnKind, values: &[&Value]) -> Result<Series> {
    let name = PlSmallStr::from_str(name);
    let series = match kind {
        ColumnKind::Bool => {
            let v: Vec<Option<bool>> = values.iter().map(|x| x.as_bool()).collect();
            Series::new(name, v)
        }
        ColumnKind::Int => {
            let v: Vec<Option<i64>> = values.iter().map(|x| x.as_i64()).collect();
            Series::new(name, v)
        }
        ColumnKind::Float => {
            let v: Vec<Option<f64>> = values.iter().map(|x| x.as_f64()).collect();
            Series::new(name, v)
        }
        ColumnKind::Date => {
            let v: Vec<Option<i32>> = values
                .iter()
                .map(|x| match x {
                    Value::Date(d) => Some(days_since_epoch(d)),
                    _ => None,
                })
                .collect();
            Series::new(name, v).cast(&DataType::Date)?
        }
        ColumnKind::Timestamp => {
            let v: Vec<Option<i64>> = values
                .iter()
                .map(|x| match x {
                    Value::Timestamp(t) => Some(t.timestamp_micros()),
                    _ => None,
                })
                .collect();
            Series::new(name, v).cast(&timestamp_dtype())?
        }
        ColumnKind::Str => {
            let v: Vec<Option<String>> = values
                .iter()
                .map(|x| if x.is_null() { None } else { Some(x.to_string()) })
                .collect();
            Series::new(name, v)
        }
    };
    Ok(series)
}

fn series_values(series: &Series) -> Result<Vec<Value>> {
    let values = match series.dtype() {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map(Value::Bool).unwrap_or(Value::Null))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map(Value::Int).unwrap_or(Value::Null))
            .collect(),
        DataType::Float32 | DataType::Float64 => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
            .collect(),
        DataType::Date => series
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|v| {
                v.and_then(|days| epoch().checked_add_signed(chrono::Duration::days(days as i64)))
                    .map(Value::Date)
                    .unwrap_or(Value::Null)
            })
            .collect(),
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            series
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|v| {
                    v.and_then(|raw| {
                        let micros = match unit {
                            TimeUnit::Nanoseconds => raw / 1_000,
                            TimeUnit::Microseconds => raw,
                            TimeUnit::Milliseconds => raw * 1_000,
                        };
                        DateTime::from_timestamp_micros(micros)
                    })
                    .map(Value::Timestamp)
                    .unwrap_or(Value::Null)
                })
                .collect()
        }
        DataType::Null => vec![Value::Null; series.len()],
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map(|s| Value::Str(s.to_string())).unwrap_or(Value::Null))
            .collect(),
    };
    Ok(values)
}

impl Table {
    /// Convert to a polars frame, one typed column per table column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.width());
        for (i, name) in self.columns().iter().enumerate() {
            let values: Vec<&Value> = self.raw_rows().iter().map(|r| &r[i]).collect();
            let kind = infer_kind(values.iter().copied());
            columns.push(Column::from(build_series(name, kind, &values)?));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Read a polars frame back into rows.
    pub fn from_frame(df: &DataFrame) -> Result<Table> {
        let mut names = Vec::with_capacity(df.width());
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            names.push(column.name().to_string());
            columns.push(series_values(column.as_materialized_series())?);
        }
        let rows = (0..df.height())
            .map(|i| columns.iter().map(|c| c[i].clone()).collect())
            .collect();
        Table::from_parts(names, rows)
    }
}

/// Anything the lake can write as a Parquet table.
pub trait IntoFrame {
    fn to_frame(&self) -> Result<DataFrame>;
}

impl IntoFrame for Table {
    fn to_frame(&self) -> Result<DataFrame> {
        Table::to_frame(self)
    }
}

impl IntoFrame for DataFrame {
    fn to_frame(&self) -> Result<DataFrame> {
        Ok(self.clone())
    }
}

/// A UTC instant as a microsecond `Datetime` literal.
pub fn timestamp_lit(at: DateTime<Utc>) -> Expr {
    lit(at.timestamp_micros()).cast(timestamp_dtype())
}

/// A typed null `Datetime` literal.
pub fn null_timestamp() -> Expr {
    lit(NULL).cast(timestamp_dtype())
}

pub fn date_lit(date: NaiveDate) -> Expr {
    lit(days_since_epoch(&date)).cast(DataType::Date)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn require_column(df: &DataFrame, name: &str) -> Result<()> {
    if has_column(df, name) {
        Ok(())
    } else {
        Err(LakeError::MissingColumn {
            column: name.to_string(),
        })
    }
}

/// Column names of a frame, owned.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_str()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `name` as text. Whole floats render without a fraction so that an id
/// read back as `Float64` still matches its string form.
pub fn text_expr(df: &DataFrame, name: &str) -> Result<Expr> {
    let dtype = df.column(name)?.dtype();
    Ok(if dtype.is_float() {
        col(name).cast(DataType::Int64).cast(DataType::String)
    } else {
        col(name).cast(DataType::String)
    })
}

/// Union of rows across frames; columns are the union of all schemas and
/// clashing dtypes widen to their common supertype.
pub fn concat_diagonal(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut frames: Vec<DataFrame> = frames.into_iter().filter(|f| f.width() > 0).collect();
    match frames.len() {
        0 => Ok(DataFrame::empty()),
        1 => Ok(frames.remove(0)),
        _ => {
            let lazy: Vec<LazyFrame> = frames.into_iter().map(DataFrame::lazy).collect();
            let args = UnionArgs {
                to_supertypes: true,
                ..Default::default()
            };
            Ok(concat_lf_diagonal(lazy, args)?.collect()?)
        }
    }
}

/// Keep one row per `keys`, surviving rows in their original order.
pub fn unique_by(df: &DataFrame, keys: &[&str], keep: UniqueKeepStrategy) -> Result<DataFrame> {
    if df.width() == 0 {
        return Ok(df.clone());
    }
    for key in keys {
        require_column(df, key)?;
    }
    let subset: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    Ok(df.unique_stable(Some(&subset), keep, None)?)
}

/// Add an all-null String column for each of `names` the frame lacks.
pub fn with_null_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let mut out = df.clone();
    for name in names.iter().filter(|n| !has_column(df, n)) {
        out.with_column(Column::full_null(
            PlSmallStr::from_str(name),
            df.height(),
            &DataType::String,
        ))?;
    }
    Ok(out)
}

/// Project the subset of `names` present, in the order given.
pub fn select_existing(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let present: Vec<&str> = names.iter().copied().filter(|n| has_column(df, n)).collect();
    Ok(df.select(present)?)
}

/// Project exactly `names`, adding null columns for any that are missing.
pub fn select_or_null(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    select_existing(&with_null_columns(df, names)?, names)
}

/// Rename the pairs whose source column exists.
pub fn rename_existing(df: &DataFrame, pairs: &[(&str, &str)]) -> Result<DataFrame> {
    let mut out = df.clone();
    for (from, to) in pairs {
        if has_column(&out, from) {
            out.rename(from, PlSmallStr::from_str(to))?;
        }
    }
    Ok(out)
}

/// Left join keeping left row order. The right key is coalesced away, other
/// clashing right columns get a `_right` suffix and null keys never match.
pub fn left_join(left: &DataFrame, right: &DataFrame, left_on: &str, right_on: &str) -> Result<DataFrame> {
    require_column(left, left_on)?;
    require_column(right, right_on)?;
    let args = JoinArgs {
        maintain_order: MaintainOrderJoin::Left,
        ..JoinArgs::new(JoinType::Left)
    };
    Ok(left
        .clone()
        .lazy()
        .join(right.clone().lazy(), [col(left_on)], [col(right_on)], args)
        .collect()?)
}

/// The first key that appears more than once, with how often it appears.
pub fn duplicate_key(df: &DataFrame, key: &str) -> Result<Option<(String, usize)>> {
    const KEY: &str = "__key";
    const COUNT: &str = "__count";
    let dupes = df
        .clone()
        .lazy()
        .group_by_stable([text_expr(df, key)?.alias(KEY)])
        .agg([len().alias(COUNT)])
        .filter(col(COUNT).gt(lit(1)))
        .collect()?;
    if dupes.height() == 0 {
        return Ok(None);
    }
    let key = dupes
        .column(KEY)?
        .str()?
        .get(0)
        .unwrap_or_default()
        .to_string();
    let count = dupes
        .column(COUNT)?
        .cast(&DataType::Int64)?
        .i64()?
        .get(0)
        .unwrap_or_default();
    Ok(Some((key, count as usize)))
}

/// Text values of a column, nulls as `None`.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    require_column(df, name)?;
    let text = df
        .clone()
        .lazy()
        .select([text_expr(df, name)?])
        .collect()?;
    Ok(text
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
