//! Entry point: parse CLI and dispatch to job handlers.

use clap::Parser;
use ffl_lake::{
    cli::{BronzeCmd, Cli, Commands},
    commands::{
        fantasycalc::handle_fantasycalc,
        ktc::{handle_ktc_history, handle_ktc_rankings},
        nflverse::handle_nflverse,
        silver::handle_silver,
        sleeper::{
            handle_commissioner_overrides, handle_sleeper_drafts, handle_sleeper_league,
            handle_sleeper_lineage, handle_sleeper_players, handle_sleeper_rosters,
            handle_sleeper_transactions_full, handle_sleeper_transactions_leg,
            handle_sleeper_users,
        },
        JobContext,
    },
    config::Config,
    sources::{
        fantasycalc::FantasyCalcClient,
        ktc::{Board, KtcClient},
        nflverse::NflverseClient,
        sleeper::{SleeperClient, SleeperGraphQl},
    },
};
use tracing_subscriber::EnvFilter;

fn board(devy: bool) -> Board {
    if devy {
        Board::Devy
    } else {
        Board::Dynasty
    }
}

async fn run_bronze(ctx: &JobContext, cmd: BronzeCmd) -> ffl_lake::Result<()> {
    let sleeper = SleeperClient::new(ctx.client.clone());
    match cmd {
        BronzeCmd::SleeperLineage { user_id, season } => {
            handle_sleeper_lineage(ctx, &sleeper, user_id, season).await
        }
        BronzeCmd::SleeperLeague => handle_sleeper_league(ctx, &sleeper).await,
        BronzeCmd::SleeperRosters => handle_sleeper_rosters(ctx, &sleeper).await,
        BronzeCmd::SleeperUsers => handle_sleeper_users(ctx, &sleeper).await,
        BronzeCmd::SleeperPlayers => handle_sleeper_players(ctx, &sleeper).await,
        BronzeCmd::SleeperTransactions { incremental, leg } => {
            if incremental {
                handle_sleeper_transactions_leg(ctx, &sleeper, leg).await
            } else {
                let graphql = SleeperGraphQl::new(ctx.client.clone());
                handle_sleeper_transactions_full(ctx, &sleeper, &graphql).await
            }
        }
        BronzeCmd::SleeperDrafts => handle_sleeper_drafts(ctx, &sleeper).await,
        BronzeCmd::CommissionerOverrides { file } => handle_commissioner_overrides(ctx, &file).await,
        BronzeCmd::KtcRankings { devy } => {
            handle_ktc_rankings(ctx, &KtcClient::new(ctx.client.clone()), board(devy)).await
        }
        BronzeCmd::KtcHistory { devy } => {
            handle_ktc_history(ctx, &KtcClient::new(ctx.client.clone()), board(devy)).await
        }
        BronzeCmd::Fantasycalc => {
            handle_fantasycalc(ctx, &FantasyCalcClient::new(ctx.client.clone())).await
        }
        BronzeCmd::Nflverse { force, full } => {
            handle_nflverse(ctx, &NflverseClient::new(ctx.client.clone()), force, full).await
        }
    }
}

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.local)?;
    let ctx = JobContext::new(config)?;

    match cli.command {
        Commands::Bronze { cmd } => run_bronze(&ctx, cmd).await?,
        Commands::Silver { dim } => handle_silver(&ctx, dim).await?,
    }

    Ok(())
}
