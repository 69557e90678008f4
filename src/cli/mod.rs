//! CLI argument definitions and parsing.

pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use types::{Leg, Season, UserId};

use crate::commands::silver::SilverDim;

#[derive(Debug, Subcommand)]
pub enum BronzeCmd {
    /// Walk every league lineage of a user and land the full league history.
    SleeperLineage {
        /// Sleeper user id (or set `SLEEPER_USER_ID`).
        #[clap(long)]
        user_id: Option<UserId>,

        /// Season to start from; defaults to Sleeper's current season.
        #[clap(long, short)]
        season: Option<Season>,
    },

    /// Refresh in-season leagues (incremental league load).
    SleeperLeague,

    /// Daily roster snapshot of active leagues.
    SleeperRosters,

    /// Weekly users snapshot of active leagues.
    SleeperUsers,

    /// Full Sleeper player catalog.
    SleeperPlayers,

    /// League transactions.
    ///
    /// By default the complete history of every league via GraphQL (needs
    /// `SLEEPER_AUTH_TOKEN`, or `SLEEPER_EMAIL` and `SLEEPER_PASSWORD`).
    /// With `--incremental`, one leg per active league from the REST API.
    SleeperTransactions {
        /// Load a single leg from the REST API instead of the full history.
        #[clap(long)]
        incremental: bool,

        /// Leg to load with `--incremental`; defaults to the current leg.
        #[clap(long, requires = "incremental")]
        leg: Option<Leg>,
    },

    /// Drafts, draft order, picks and traded picks of every league.
    SleeperDrafts,

    /// Land commissioner pick reassignments from a JSON file.
    CommissionerOverrides {
        /// JSON array of override entries.
        #[clap(long)]
        file: PathBuf,
    },

    /// Today's KeepTradeCut rankings board.
    KtcRankings {
        /// Devy board instead of dynasty.
        #[clap(long)]
        devy: bool,
    },

    /// Full KeepTradeCut value history of every ranked player.
    KtcHistory {
        /// Devy board instead of dynasty.
        #[clap(long)]
        devy: bool,
    },

    /// FantasyCalc dynasty values for every league shape.
    Fantasycalc,

    /// nflverse datasets due today.
    Nflverse {
        /// Load every dataset regardless of schedule (also `FORCE_RUN=true`).
        #[clap(long)]
        force: bool,

        /// Backfill every season of the seasonal datasets.
        #[clap(long)]
        full: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "ffl-lake",
    version,
    about = "Fantasy football data lake: bronze ingestion and silver dimensions"
)]
pub struct Cli {
    /// Write to a local directory instead of GCS (`FFL_LAKE_ROOT`, or the
    /// platform data directory).
    #[clap(long, global = true)]
    pub local: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Land raw source data in the bronze layer
    Bronze {
        #[clap(subcommand)]
        cmd: BronzeCmd,
    },

    /// Build silver dimensions from bronze
    Silver {
        #[clap(value_enum)]
        dim: SilverDim,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bronze_lineage() {
        let cli = Cli::try_parse_from([
            "ffl-lake",
            "bronze",
            "sleeper-lineage",
            "--user-id",
            "123",
            "--season",
            "2024",
        ])
        .unwrap();
        match cli.command {
            Commands::Bronze {
                cmd: BronzeCmd::SleeperLineage { user_id, season },
            } => {
                assert_eq!(user_id, Some(UserId::new("123")));
                assert_eq!(season, Some(Season::new(2024)));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(!cli.local);
    }

    #[test]
    fn test_parse_transactions_leg_requires_incremental() {
        assert!(Cli::try_parse_from(["ffl-lake", "bronze", "sleeper-transactions", "--leg", "3"]).is_err());

        let cli = Cli::try_parse_from([
            "ffl-lake",
            "--local",
            "bronze",
            "sleeper-transactions",
            "--incremental",
            "--leg",
            "3",
        ])
        .unwrap();
        assert!(cli.local);
        assert!(matches!(
            cli.command,
            Commands::Bronze {
                cmd: BronzeCmd::SleeperTransactions {
                    incremental: true,
                    leg: Some(Leg(3))
                }
            }
        ));
    }

    #[test]
    fn test_parse_silver_dims() {
        let cli = Cli::try_parse_from(["ffl-lake", "silver", "leagues-meta"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Silver {
                dim: SilverDim::LeaguesMeta
            }
        ));
        assert!(Cli::try_parse_from(["ffl-lake", "silver", "teams"]).is_err());
    }

    #[test]
    fn test_parse_nflverse_flags() {
        let cli = Cli::try_parse_from(["ffl-lake", "bronze", "nflverse", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Bronze {
                cmd: BronzeCmd::Nflverse {
                    force: true,
                    full: false
                }
            }
        ));
    }
}
