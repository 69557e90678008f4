//! nflverse statistics releases
//!
//! Datasets are published as Parquet release assets. Seasonal datasets land
//! under `season=YYYY`, the rest under the load date.

use chrono::{Datelike, NaiveDate, Weekday};
use reqwest::Client;
use std::fmt;
use tracing::{error, info};

use crate::cli::types::Season;
use crate::core::http::get_bytes;
use crate::storage::paths::{bronze_path, DATA_FILE};
use crate::storage::{Lake, Partition};
use crate::table::parquet::{filter_parquet_eq, parquet_height};
use crate::{error::LakeError, Result};


/// Bronze source directory.
pub const SOURCE: &str = "nflverse";

pub const NFLVERSE_RELEASES_URL: &str = "https://github.com/nflverse/nflverse-data/releases/download";
pub const DYNASTYPROCESS_URL: &str = "https://github.com/dynastyprocess/data/raw/master/files";
pub const FFOPPORTUNITY_URL: &str = "https://github.com/ffverse/ffopportunity/releases/download";

pub const FANTASY_PLAYER_IDS_FOLDER: &str = "fantasy_player_ids";
pub const NFL_PLAYERS_FOLDER: &str = "nfl_players";

/// When a dataset is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    /// Weekly sets settle after Monday night corrections.
    Weekly(Weekday),
}

/// Which release host serves an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Nflverse,
    DynastyProcess,
    FfOpportunity,
}

/// Base URLs per host; overridable so tests can point everything at a mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    pub nflverse: String,
    pub dynastyprocess: String,
    pub ffopportunity: String,
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            nflverse: NFLVERSE_RELEASES_URL.to_string(),
            dynastyprocess: DYNASTYPROCESS_URL.to_string(),
            ffopportunity: FFOPPORTUNITY_URL.to_string(),
        }
    }
}

impl Hosts {
    /// Every host served from one base URL.
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            nflverse: base.clone(),
            dynastyprocess: base.clone(),
            ffopportunity: base,
        }
    }

    fn base(&self, host: Host) -> &str {
        match host {
            Host::Nflverse => &self.nflverse,
            Host::DynastyProcess => &self.dynastyprocess,
            Host::FfOpportunity => &self.ffopportunity,
        }
    }
}

/// One entry in the dataset catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub name: &'static str,
    /// Directory under `bronze/nflverse/`.
    pub folder: &'static str,
    /// Partitioned by season rather than by load date.
    pub seasonal: bool,
    pub schedule: Schedule,
    pub host: Host,
    /// Asset path below the host; `{season}` is substituted.
    pub asset: &'static str,
    /// The asset spans every season and must be cut to the one loaded.
    pub filter_season: bool,
    /// Earliest season the asset exists for.
    pub first_season: u16,
}

const fn daily(name: &'static str, folder: &'static str, asset: &'static str, first_season: u16) -> Dataset {
    Dataset {
        name,
        folder,
        seasonal: true,
        schedule: Schedule::Daily,
        host: Host::Nflverse,
        asset,
        filter_season: false,
        first_season,
    }
}

const fn weekly(name: &'static str, folder: &'static str, host: Host, asset: &'static str) -> Dataset {
    Dataset {
        name,
        folder,
        seasonal: false,
        schedule: Schedule::Weekly(Weekday::Tue),
        host,
        asset,
        filter_season: false,
        first_season: 0,
    }
}

pub const DATASETS: &[Dataset] = &[
    daily("play_by_play", "play_by_play", "pbp/play_by_play_{season}.parquet", 1999),
    daily(
        "player_stats",
        "player_stats",
        "stats_player/stats_player_week_{season}.parquet",
        1999,
    ),
    daily(
        "team_stats",
        "team_stats",
        "stats_team/stats_team_week_{season}.parquet",
        1999,
    ),
    Dataset {
        filter_season: true,
        ..daily("schedules", "schedules", "schedules/games.parquet", 1999)
    },
    daily("rosters", "rosters", "rosters/roster_{season}.parquet", 1999),
    daily(
        "rosters_weekly",
        "rosters_weekly",
        "weekly_rosters/roster_weekly_{season}.parquet",
        2002,
    ),
    daily(
        "depth_charts",
        "depth_charts",
        "depth_charts/depth_charts_{season}.parquet",
        2001,
    ),
    daily("snap_counts", "snap_counts", "snap_counts/snap_counts_{season}.parquet", 2012),
    Dataset {
        filter_season: true,
        ..daily("nextgen_stats", "nextgen_stats", "nextgen_stats/ngs_passing.parquet", 2016)
    },
    daily("ftn_charting", "ftn_charting", "ftn_charting/ftn_charting_{season}.parquet", 2022),
    Dataset {
        filter_season: true,
        ..daily("officials", "officials", "officials/officials.parquet", 2015)
    },
    weekly(
        "ff_rankings",
        "fantasy_rankings",
        Host::DynastyProcess,
        "db_fpecr_latest.parquet",
    ),
    weekly(
        "ff_opportunity",
        "fantasy_opportunity",
        Host::FfOpportunity,
        "latest-data/ep_weekly_{season}.parquet",
    ),
    weekly(
        "ff_player_ids",
        FANTASY_PLAYER_IDS_FOLDER,
        Host::DynastyProcess,
        "db_playerids.parquet",
    ),
    weekly(
        "nfl_players",
        NFL_PLAYERS_FOLDER,
        Host::Nflverse,
        "players/players.parquet",
    ),
];

/// Whether a dataset is due on `today`.
pub fn should_run(dataset: &Dataset, today: NaiveDate, force: bool) -> bool {
    if force {
        return true;
    }
    match dataset.schedule {
        Schedule::Daily => true,
        Schedule::Weekly(day) => today.weekday() == day,
    }
}

/// Season in progress (or most recently finished) on `today`.
pub fn current_season(today: NaiveDate) -> Season {
    Season::for_date(today)
}

pub fn asset_url(hosts: &Hosts, dataset: &Dataset, season: Season) -> String {
    format!(
        "{}/{}",
        hosts.base(dataset.host),
        dataset.asset.replace("{season}", &season.to_string())
    )
}

/// Bronze object a dataset lands at for a given run.
pub fn dataset_path(dataset: &Dataset, season: Season, load_date: NaiveDate) -> String {
    let partition = if dataset.seasonal {
        Partition::Season(season.as_i32())
    } else {
        Partition::LoadDate(load_date)
    };
    bronze_path(SOURCE, dataset.folder, partition, DATA_FILE)
}

/// Outcome of one dataset in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded { rows: usize, path: String },
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetResult {
    pub name: String,
    pub season: Option<Season>,
    pub outcome: Outcome,
}

/// Tally of a run's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub loaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(results: &[DatasetResult]) -> Self {
        results.iter().fold(Self::default(), |mut s, r| {
            match r.outcome {
                Outcome::Loaded { .. } => s.loaded += 1,
                Outcome::Skipped => s.skipped += 1,
                Outcome::Failed(_) => s.failed += 1,
            }
            s
        })
    }

    /// `Err(BatchFailed)` when any dataset failed.
    pub fn into_result(self, job: &str) -> Result<Self> {
        if self.failed > 0 {
            return Err(LakeError::BatchFailed {
                job: job.to_string(),
                failed: self.failed,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded | {} skipped | {} failed",
            self.loaded, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct NflverseClient {
    client: Client,
    hosts: Hosts,
}

impl NflverseClient {
    pub fn new(client: Client) -> Self {
        Self::with_hosts(client, Hosts::default())
    }

    pub fn with_hosts(client: Client, hosts: Hosts) -> Self {
        Self { client, hosts }
    }

    /// Download one dataset for `season` and land it; returns rows and path.
    pub async fn load(
        &self,
        lake: &Lake,
        dataset: &Dataset,
        season: Season,
        load_date: NaiveDate,
    ) -> Result<(usize, String)> {
        let url = asset_url(&self.hosts, dataset, season);
        let bytes = get_bytes(&self.client, &url).await?;

        let (bytes, rows) = if dataset.filter_season {
            filter_parquet_eq(bytes, "season", season.as_i32().into())?
        } else {
            let rows = parquet_height(bytes.clone())?;
            (bytes, rows)
        };
        if rows == 0 {
            return Err(LakeError::InvalidValue {
                message: format!("{} returned no rows for {season}", dataset.name),
            });
        }

        let path = lake
            .put_bytes(&dataset_path(dataset, season, load_date), bytes)
            .await?;
        Ok((rows, path))
    }

    async fn load_logged(
        &self,
        lake: &Lake,
        dataset: &Dataset,
        season: Season,
        load_date: NaiveDate,
    ) -> DatasetResult {
        let outcome = match self.load(lake, dataset, season, load_date).await {
            Ok((rows, path)) => {
                info!(dataset = dataset.name, rows, path = %path, "loaded dataset");
                Outcome::Loaded { rows, path }
            }
            Err(err) => {
                error!(dataset = dataset.name, %season, error = %err, "dataset failed");
                Outcome::Failed(err.to_string())
            }
        };
        DatasetResult {
            name: dataset.name.to_string(),
            season: dataset.seasonal.then_some(season),
            outcome,
        }
    }

    /// Refresh every dataset due on `today` for the current season.
    pub async fn run_daily(
        &self,
        lake: &Lake,
        datasets: &[Dataset],
        today: NaiveDate,
        force: bool,
    ) -> Vec<DatasetResult> {
        let season = current_season(today);
        info!(%today, weekday = %today.weekday(), %season, force, "nflverse daily load");

        let mut results = Vec::with_capacity(datasets.len());
        for dataset in datasets {
            if !should_run(dataset, today, force) {
                info!(dataset = dataset.name, schedule = ?dataset.schedule, "not scheduled today");
                results.push(DatasetResult {
                    name: dataset.name.to_string(),
                    season: None,
                    outcome: Outcome::Skipped,
                });
                continue;
            }
            results.push(self.load_logged(lake, dataset, season, today).await);
        }
        results
    }

    /// Backfill every season of each seasonal dataset, then the others once.
    pub async fn run_full(
        &self,
        lake: &Lake,
        datasets: &[Dataset],
        today: NaiveDate,
    ) -> Vec<DatasetResult> {
        let current = current_season(today);
        let mut results = Vec::new();
        for dataset in datasets {
            if !dataset.seasonal {
                results.push(self.load_logged(lake, dataset, current, today).await);
                continue;
            }
            info!(
                dataset = dataset.name,
                from = dataset.first_season,
                to = current.as_u16(),
                "backfilling seasons"
            );
            for year in dataset.first_season..=current.as_u16() {
                results.push(self.load_logged(lake, dataset, Season::new(year), today).await);
            }
        }
        results
    }
}
