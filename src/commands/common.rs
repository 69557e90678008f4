//! Shared job plumbing.
//!
//! Every job runs against a [`JobContext`]: the lake it writes to, the HTTP
//! client its sources share, and the run timestamp stamped on its rows.

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::DataFrame;
use reqwest::Client;
use tracing::info;

use crate::{
    cli::types::LeagueId,
    config::Config,
    core::http::{build_client, DEFAULT_TIMEOUT},
    error::LakeError,
    silver::{dims::BronzePair, DIM_LEAGUES},
    sources::sleeper::{league_entity, Load, SOURCE as SLEEPER},
    storage::{
        paths::{bronze_path, silver_path},
        Lake, Partition,
    },
    table::{
        frame::{has_column, string_values},
        IntoFrame,
    },
    Result,
};

/// Resources a job needs.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub lake: Lake,
    pub client: Client,
    pub config: Config,
    /// Run timestamp; the load date is its UTC date.
    pub now: DateTime<Utc>,
}

impl JobContext {
    /// Open the configured store and build the shared client.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(DEFAULT_TIMEOUT)?;
        let lake = Lake::new(config.open_store(&client));
        Ok(Self::with_lake(lake, client, config, Utc::now()))
    }

    pub fn with_lake(lake: Lake, client: Client, config: Config, now: DateTime<Utc>) -> Self {
        Self {
            lake,
            client,
            config,
            now,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// `load_date=` partition for this run.
    pub fn load_date(&self) -> Partition {
        Partition::LoadDate(self.today())
    }

    /// Write `(entity, table)` pairs to `bronze/{source}/{entity}/{partition}/{file}`.
    ///
    /// Returns how many tables were written; empty ones are skipped.
    pub async fn write_bronze<'a, I, T>(
        &self,
        source: &str,
        entities: I,
        partition: Partition,
        file: &str,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = (String, &'a T)>,
        T: IntoFrame + ?Sized + 'a,
    {
        let mut written = 0;
        for (entity, table) in entities {
            let path = bronze_path(source, &entity, partition, file);
            if self.lake.write_table(&path, table).await?.is_some() {
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Full and incremental loads of a Sleeper league entity.
///
/// The full load is required; a missing incremental load reads as empty.
pub async fn bronze_pair(lake: &Lake, entity: &str) -> Result<BronzePair> {
    let full = lake
        .read_latest_bronze(&league_entity(entity, Load::FullLoad), SLEEPER)
        .await?;
    let incremental = match lake
        .read_latest_bronze(&league_entity(entity, Load::Incremental), SLEEPER)
        .await
    {
        Ok(table) => table,
        Err(LakeError::NoBronzeData { prefix }) => {
            info!(%prefix, "no incremental load yet");
            DataFrame::empty()
        }
        Err(err) => return Err(err),
    };
    Ok(BronzePair::new(full, incremental))
}

/// Every Sleeper league the lake knows about.
///
/// Prefers the silver `dim_leagues`; before the first silver run the bronze
/// league loads are merged instead.
pub async fn known_leagues(lake: &Lake) -> Result<DataFrame> {
    if let Some(table) = lake.read_table_opt(&silver_path(DIM_LEAGUES)).await? {
        return Ok(table);
    }
    bronze_pair(lake, "leagues").await?.merged()
}

/// League ids whose `status` satisfies `keep`, in first-seen order; a
/// missing status reads as `None`.
pub fn league_ids_where<F>(leagues: &DataFrame, keep: F) -> Result<Vec<LeagueId>>
where
    F: Fn(Option<&str>) -> bool,
{
    let ids = string_values(leagues, "league_id")?;
    let statuses = if has_column(leagues, "status") {
        string_values(leagues, "status")?
    } else {
        vec![None; ids.len()]
    };
    let mut kept: Vec<String> = Vec::new();
    for (id, status) in ids.into_iter().zip(statuses) {
        match id {
            Some(id) if keep(status.as_deref()) && !kept.contains(&id) => kept.push(id),
            _ => {}
        }
    }
    Ok(kept.into_iter().map(LeagueId::new).collect())
}

/// Leagues whose season is not yet complete.
pub fn active_league_ids(leagues: &DataFrame) -> Result<Vec<LeagueId>> {
    league_ids_where(leagues, |status| status != Some("complete"))
}
