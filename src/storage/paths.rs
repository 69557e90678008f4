//! Bronze and silver path conventions

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt;

use super::store::{ObjectMeta, ObjectStore};
use crate::{error::LakeError, Result};

pub const BRONZE_ROOT: &str = "bronze";
pub const SILVER_ROOT: &str = "silver/fantasy";
pub const DATA_FILE: &str = "data.parquet";

pub const LOAD_DATE_KEY: &str = "load_date";
pub const WEEK_START_KEY: &str = "week_start";

/// Hive-style partition directory appended to an entity path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    LoadDate(NaiveDate),
    WeekStart(NaiveDate),
    Season(i32),
    Leg(u32),
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::LoadDate(d) => write!(f, "load_date={}", d.format("%Y-%m-%d")),
            Partition::WeekStart(d) => write!(f, "week_start={}", d.format("%Y-%m-%d")),
            Partition::Season(s) => write!(f, "season={s}"),
            Partition::Leg(l) => write!(f, "leg={l}"),
        }
    }
}

/// `bronze/{source}/{entity}/{partition}/{file}`
pub fn bronze_path(source: &str, entity: &str, partition: Partition, file: &str) -> String {
    format!(
        "{BRONZE_ROOT}/{source}/{}/{partition}/{file}",
        entity.trim_matches('/')
    )
}

/// `silver/fantasy/{dim}/data.parquet`
pub fn silver_path(dim: &str) -> String {
    format!("{SILVER_ROOT}/{dim}/{DATA_FILE}")
}

/// Most recent `weekday` on or before `date`.
pub fn week_start_for(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .unwrap_or(date)
}

/// Value of the `{key}=` directory in an object name.
pub fn partition_value<'a>(name: &'a str, key: &str) -> Option<&'a str> {
    name.split('/')
        .find_map(|seg| seg.strip_prefix(key)?.strip_prefix('='))
        .filter(|s| !s.is_empty())
}

/// Pull the `load_date=` value out of an object name.
pub fn load_date_of(name: &str) -> Option<&str> {
    partition_value(name, LOAD_DATE_KEY)
}

/// Parquet objects in the newest `{key}=` partition of a bronze entity.
///
/// Partition values are ISO dates, so the lexicographic maximum is the latest.
pub async fn latest_partition_objects(
    store: &dyn ObjectStore,
    entity: &str,
    source: &str,
    key: &str,
) -> Result<(String, Vec<ObjectMeta>)> {
    let prefix = format!("{BRONZE_ROOT}/{source}/{}", entity.trim_matches('/'));
    let parquet: Vec<ObjectMeta> = store
        .list(&prefix)
        .await?
        .into_iter()
        .filter(|o| o.name.ends_with(".parquet") && partition_value(&o.name, key).is_some())
        .collect();

    let latest = parquet
        .iter()
        .filter_map(|o| partition_value(&o.name, key))
        .max()
        .map(str::to_string)
        .ok_or_else(|| LakeError::NoBronzeData {
            prefix: prefix.clone(),
        })?;

    let objects = parquet
        .into_iter()
        .filter(|o| partition_value(&o.name, key) == Some(latest.as_str()))
        .collect();
    Ok((latest, objects))
}

/// Parquet objects in the newest `load_date=` partition of a bronze entity.
pub async fn latest_bronze_objects(
    store: &dyn ObjectStore,
    entity: &str,
    source: &str,
) -> Result<(String, Vec<ObjectMeta>)> {
    latest_partition_objects(store, entity, source, LOAD_DATE_KEY).await
}

/// Path of the canonical data file in the newest partition of a bronze entity.
pub async fn latest_bronze_path(
    store: &dyn ObjectStore,
    entity: &str,
    source: &str,
) -> Result<String> {
    let (latest, _) = latest_bronze_objects(store, entity, source).await?;
    Ok(format!(
        "{BRONZE_ROOT}/{source}/{}/{LOAD_DATE_KEY}={latest}/{DATA_FILE}",
        entity.trim_matches('/')
    ))
}

/// Newest object under `prefix` by creation time, ignoring directory markers.
pub async fn latest_object(store: &dyn ObjectStore, prefix: &str) -> Result<Option<ObjectMeta>> {
    Ok(store
        .list(prefix)
        .await?
        .into_iter()
        .filter(|o| !o.name.ends_with('/'))
        .max_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name))))
}
