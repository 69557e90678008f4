//! Parquet encoding for polars frames.

use crate::error::{LakeError, Result};
use polars::prelude::*;
use std::io::Cursor;

/// Encode a frame as Parquet bytes.
pub fn write_parquet(df: &DataFrame) -> Result<Vec<u8>> {
    let mut df = df.clone();
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf).finish(&mut df)?;
    Ok(buf)
}

/// Decode Parquet bytes into a frame.
pub fn read_parquet(bytes: Vec<u8>) -> Result<DataFrame> {
    Ok(ParquetReader::new(Cursor::new(bytes)).finish()?)
}

/// Row count of a Parquet payload.
pub fn parquet_height(bytes: Vec<u8>) -> Result<usize> {
    Ok(read_parquet(bytes)?.height())
}

/// Keep the rows of a Parquet payload whose integer `column` equals `value`.
///
/// Returns the re-encoded payload and its row count.
pub fn filter_parquet_eq(bytes: Vec<u8>, column: &str, value: i64) -> Result<(Vec<u8>, usize)> {
    let df = read_parquet(bytes)?;
    let series = df
        .column(column)
        .map_err(|_| LakeError::MissingColumn {
            column: column.to_string(),
        })?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    let mask = series.i64()?.equal(value);
    let filtered = df.filter(&mask)?;
    Ok((write_parquet(&filtered)?, filtered.height()))
}
