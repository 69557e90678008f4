//! Sleeper bronze jobs

use chrono::Weekday;
use serde_json::Value as Json;
use std::future::Future;
use std::path::Path;
use tracing::{error, info, warn};

use crate::{
    cli::types::{DraftId, LeagueId, Leg, Season, UserId},
    sources::sleeper::{
        drafts_entity,
        flatten::{
            flatten_commissioner_overrides, flatten_draft_picks, flatten_drafts,
            flatten_leagues, flatten_lineages, flatten_players, flatten_rosters,
            flatten_traded_picks, flatten_transactions, flatten_users, TransactionTables,
        },
        league_entity, rosters_entity, transactions_entity, user_lineages, Load, SleeperClient,
        SleeperGraphQl, DEFAULT_SPORT, OVERRIDES_ENTITY, PLAYERS_ENTITY, SOURCE,
        TRANSACTIONS_DAILY_ENTITY, USERS_ENTITY,
    },
    storage::{
        paths::{week_start_for, DATA_FILE},
        Partition,
    },
    table::frame::concat_diagonal,
    Result,
};

use super::common::{active_league_ids, known_leagues, league_ids_where, JobContext};

/// Fetch something per league, logging and skipping leagues that fail.
async fn per_league<T, F, Fut>(
    sleeper: &SleeperClient,
    league_ids: &[LeagueId],
    what: &str,
    fetch: F,
) -> Vec<(LeagueId, T)>
where
    F: Fn(LeagueId) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut out = Vec::with_capacity(league_ids.len());
    for (i, league_id) in league_ids.iter().enumerate() {
        if i > 0 {
            sleeper.pacer().pause().await;
        }
        match fetch(league_id.clone()).await {
            Ok(value) => out.push((league_id.clone(), value)),
            Err(err) => error!(league_id = %league_id, what, error = %err, "league failed, skipping"),
        }
    }
    info!(what, ok = out.len(), total = league_ids.len(), "fetched per league");
    out
}

/// Walk every lineage the user belongs to and land the full league history.
pub async fn handle_sleeper_lineage(
    ctx: &JobContext,
    sleeper: &SleeperClient,
    user_id: Option<UserId>,
    season: Option<Season>,
) -> Result<()> {
    let user_id = match user_id {
        Some(id) => id,
        None => UserId::new(ctx.config.require_sleeper_user()?),
    };
    let season = match season {
        Some(season) => season,
        None => sleeper.sport_state(DEFAULT_SPORT).await?.season.parse()?,
    };

    let lineages = user_lineages(sleeper, &user_id, DEFAULT_SPORT, season).await?;
    let tables = flatten_lineages(&lineages);
    let written = ctx
        .write_bronze(
            SOURCE,
            tables
                .entities()
                .into_iter()
                .map(|(entity, table)| (league_entity(entity, Load::FullLoad), table)),
            ctx.load_date(),
            DATA_FILE,
        )
        .await?;
    info!(
        lineages = lineages.len(),
        leagues = tables.leagues.height(),
        written,
        "lineage full load complete"
    );
    Ok(())
}

/// Refresh the current season of every in-season league.
pub async fn handle_sleeper_league(ctx: &JobContext, sleeper: &SleeperClient) -> Result<()> {
    let leagues = known_leagues(&ctx.lake).await?;
    let ids = league_ids_where(&leagues, |status| status == Some("in_season"))?;
    info!(leagues = ids.len(), "refreshing in-season leagues");

    let fetched: Vec<_> = per_league(sleeper, &ids, "league", |id| async move {
        sleeper.league(&id).await
    })
    .await
    .into_iter()
    .map(|(_, league)| league)
    .collect();

    let tables = flatten_leagues(&fetched);
    ctx.write_bronze(
        SOURCE,
        tables
            .entities()
            .into_iter()
            .map(|(entity, table)| (league_entity(entity, Load::Incremental), table)),
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}

/// Daily roster snapshot of every active league.
pub async fn handle_sleeper_rosters(ctx: &JobContext, sleeper: &SleeperClient) -> Result<()> {
    let ids = active_league_ids(&known_leagues(&ctx.lake).await?)?;
    info!(leagues = ids.len(), "snapshotting rosters");

    let rosters: Vec<_> = per_league(sleeper, &ids, "rosters", |id| async move {
        sleeper.rosters(&id).await
    })
    .await
    .into_iter()
    .flat_map(|(_, rosters)| rosters)
    .collect();

    let tables = flatten_rosters(&rosters, ctx.now);
    info!(
        roster_players = tables.roster_players.height(),
        team_state = tables.team_state.height(),
        nicknames = tables.nicknames.height(),
        "flattened rosters"
    );
    ctx.write_bronze(
        SOURCE,
        tables
            .entities()
            .into_iter()
            .map(|(entity, table)| (rosters_entity(entity), table)),
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}

/// Weekly users snapshot, partitioned by the Tuesday starting the week.
pub async fn handle_sleeper_users(ctx: &JobContext, sleeper: &SleeperClient) -> Result<()> {
    let ids = active_league_ids(&known_leagues(&ctx.lake).await?)?;

    let per_league_users = per_league(sleeper, &ids, "users", |id| async move {
        sleeper.users(&id).await
    })
    .await;
    let frames = per_league_users
        .iter()
        .map(|(id, users)| flatten_users(users, id.as_str(), ctx.now))
        .collect::<Result<Vec<_>>>()?;
    let users = concat_diagonal(frames)?;

    let week_start = week_start_for(ctx.today(), Weekday::Tue);
    ctx.write_bronze(
        SOURCE,
        [(USERS_ENTITY.to_string(), &users)],
        Partition::WeekStart(week_start),
        DATA_FILE,
    )
    .await?;
    Ok(())
}

/// Full Sleeper player catalog.
pub async fn handle_sleeper_players(ctx: &JobContext, sleeper: &SleeperClient) -> Result<()> {
    let players = sleeper.all_players(DEFAULT_SPORT).await?;
    let table = flatten_players(&players);
    info!(players = table.height(), "fetched player catalog");
    ctx.write_bronze(
        SOURCE,
        [(PLAYERS_ENTITY.to_string(), &table)],
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}

/// `Authorization` value for GraphQL: a configured token, else a login.
async fn graphql_auth(ctx: &JobContext, graphql: &SleeperGraphQl) -> Result<String> {
    if let Some(token) = ctx.config.sleeper_auth_token.as_deref() {
        return Ok(token.to_string());
    }
    match ctx.config.sleeper_credentials() {
        Some((email, password)) => {
            info!("logging in to Sleeper");
            graphql.login(email, password).await
        }
        None => ctx.config.require_sleeper_auth().map(str::to_string),
    }
}

/// Complete transaction history of every known league, via GraphQL.
pub async fn handle_sleeper_transactions_full(
    ctx: &JobContext,
    sleeper: &SleeperClient,
    graphql: &SleeperGraphQl,
) -> Result<()> {
    let auth = graphql_auth(ctx, graphql).await?;
    let leagues = known_leagues(&ctx.lake).await?;
    let ids = league_ids_where(&leagues, |_| true)?;

    let auth = auth.as_str();
    let parts = per_league(sleeper, &ids, "transactions", |id| async move {
        let txns = graphql.league_transactions(&id, auth).await?;
        Ok(flatten_transactions(&txns, id.as_str()))
    })
    .await
    .into_iter()
    .map(|(_, tables)| tables)
    .collect();

    let tables = TransactionTables::concat(parts);
    info!(
        transactions = tables.transactions.height(),
        players = tables.players.height(),
        draft_picks = tables.draft_picks.height(),
        "transaction history flattened"
    );
    ctx.write_bronze(
        SOURCE,
        tables
            .entities()
            .into_iter()
            .map(|(entity, table)| (transactions_entity(entity), table)),
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}

/// One leg of transactions for every active league, one file per league.
pub async fn handle_sleeper_transactions_leg(
    ctx: &JobContext,
    sleeper: &SleeperClient,
    leg: Option<Leg>,
) -> Result<()> {
    let leg = match leg {
        Some(leg) => leg,
        None => sleeper.sport_state(DEFAULT_SPORT).await?.current_leg(),
    };
    let ids = active_league_ids(&known_leagues(&ctx.lake).await?)?;
    info!(%leg, leagues = ids.len(), "loading transactions for leg");

    let fetched = per_league(sleeper, &ids, "transactions", |id| async move {
        sleeper.transactions(&id, leg).await
    })
    .await;

    let partition = Partition::Leg(u32::from(leg.as_u16()));
    for (league_id, txns) in &fetched {
        let tables = flatten_transactions(txns, league_id.as_str());
        for (entity, table) in tables.entities() {
            let file = format!("{entity}_{league_id}.parquet");
            ctx.write_bronze(
                SOURCE,
                [(TRANSACTIONS_DAILY_ENTITY.to_string(), table)],
                partition,
                &file,
            )
            .await?;
        }
    }
    Ok(())
}

/// Drafts and draft order of every known league, then each draft's picks.
pub async fn handle_sleeper_drafts(ctx: &JobContext, sleeper: &SleeperClient) -> Result<()> {
    let leagues = known_leagues(&ctx.lake).await?;
    let ids = league_ids_where(&leagues, |_| true)?;

    let drafts: Vec<_> = per_league(sleeper, &ids, "drafts", |id| async move {
        sleeper.drafts(&id).await
    })
    .await
    .into_iter()
    .flat_map(|(_, drafts)| drafts)
    .collect();
    let (drafts_table, order) = flatten_drafts(&drafts, ctx.now);
    let (drafts_table, order) = (drafts_table.to_frame()?, order.to_frame()?);

    let mut picks: Vec<Json> = Vec::new();
    let mut traded: Vec<Json> = Vec::new();
    let mut draft_ids: Vec<&str> = Vec::new();
    for draft in &drafts {
        if !draft_ids.contains(&draft.draft_id.as_str()) {
            draft_ids.push(draft.draft_id.as_str());
        }
    }
    for (i, draft_id) in draft_ids.iter().enumerate() {
        if i > 0 {
            sleeper.pacer().pause().await;
        }
        let draft_id = DraftId::new(*draft_id);
        match sleeper.draft_picks(&draft_id).await {
            Ok(p) => picks.extend(p),
            Err(err) => error!(draft_id = %draft_id, error = %err, "draft picks failed"),
        }
        match sleeper.traded_picks(&draft_id).await {
            Ok(t) => traded.extend(t),
            Err(err) => error!(draft_id = %draft_id, error = %err, "traded picks failed"),
        }
    }
    let picks = flatten_draft_picks(&picks, ctx.now)?;
    let traded = flatten_traded_picks(&traded, ctx.now)?;
    info!(
        drafts = drafts_table.height(),
        picks = picks.height(),
        traded = traded.height(),
        "drafts flattened"
    );

    ctx.write_bronze(
        SOURCE,
        [
            (drafts_entity("drafts"), &drafts_table),
            (drafts_entity("draft_order"), &order),
            (drafts_entity("draft_picks"), &picks),
            (drafts_entity("traded_draft_picks"), &traded),
        ],
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}

/// Land commissioner pick reassignments from a JSON array file.
pub async fn handle_commissioner_overrides(ctx: &JobContext, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    let entries: Vec<Json> = serde_json::from_str(&text)?;
    let table = flatten_commissioner_overrides(&entries)?;
    if table.is_empty() {
        warn!(file = %file.display(), "no overrides in file");
    }
    ctx.write_bronze(
        SOURCE,
        [(OVERRIDES_ENTITY.to_string(), &table)],
        ctx.load_date(),
        DATA_FILE,
    )
    .await?;
    Ok(())
}
