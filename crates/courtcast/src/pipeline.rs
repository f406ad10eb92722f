// Run stages: resolve -> project -> aggregate -> rank.
//
// Every stage is sequential. Cancellation is observed only before each player
// or team starts, so a stage never stops halfway through a feed call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::feed::{pace, PlayerDirectory, RosterFeed, RosterPlayer, StatsFeed};
use crate::league::{aggregate, AggregationSettings, Player, Team};
use crate::projection::{Breakdowns, PlayerProjector};

pub use crate::league::rank_categories;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared stop request, checked between players and between teams.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Identity resolution
// ---------------------------------------------------------------------------

/// Outcome of matching platform listings to stats-provider ids.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub players: Vec<Player>,
    /// Names with no directory match. These players are left out of every
    /// later stage.
    pub excluded: Vec<String>,
}

pub fn resolve_players(directory: &PlayerDirectory, listings: &[RosterPlayer]) -> Resolution {
    let mut resolution = Resolution::default();
    for listing in listings {
        match directory.resolve(&listing.full_name) {
            Some(stats_id) => resolution
                .players
                .push(Player::from_roster(listing, stats_id)),
            None => {
                warn!(
                    "No stats id for {} ({}); excluding from projections",
                    listing.full_name, listing.platform_id
                );
                resolution.excluded.push(listing.full_name.clone());
            }
        }
    }
    info!(
        "Resolved {} players, excluded {}",
        resolution.players.len(),
        resolution.excluded.len()
    );
    resolution
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project every player in order, storing the result in `player.categories`.
///
/// Players finished before a cancellation or error keep their projections.
pub async fn project_players<F: StatsFeed + ?Sized>(
    players: &mut [Player],
    projector: &PlayerProjector<'_, F>,
    mut breakdowns: Option<&mut Breakdowns>,
    cancel: &CancelFlag,
) -> Result<(), EngineError> {
    let total = players.len();
    for (i, player) in players.iter_mut().enumerate() {
        cancel.check()?;
        player.categories = projector.project(player, breakdowns.as_deref_mut()).await?;
        if (i + 1) % 25 == 0 || i + 1 == total {
            info!("Projected {}/{} players", i + 1, total);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build every league team from its roster and compute its weekly aggregate.
///
/// Roster entries are matched to `players` by platform id; entries with no
/// projected player (unresolved identities) are skipped.
pub async fn aggregate_teams<R: RosterFeed + ?Sized>(
    feed: &R,
    players: &[Player],
    categories: &[String],
    settings: &AggregationSettings,
    cancel: &CancelFlag,
) -> Result<Vec<Team>, EngineError> {
    let by_platform: HashMap<&str, &Player> = players
        .iter()
        .map(|p| (p.platform_id.as_str(), p))
        .collect();

    let summaries = feed.teams().await?;
    let mut teams = Vec::with_capacity(summaries.len());
    for summary in summaries {
        cancel.check()?;
        let started = Instant::now();

        let roster = feed.team_roster(&summary.team_id).await?;
        let mut members = Vec::with_capacity(roster.len());
        for entry in roster {
            match by_platform.get(entry.platform_id.as_str()) {
                Some(player) => members.push((*player).clone().with_slot(entry.slot)),
                None => debug!(
                    team = %summary.team_id,
                    platform_id = %entry.platform_id,
                    "skipping unprojected roster entry"
                ),
            }
        }

        let mut team = Team::new(summary.team_id, summary.name, members);
        team.categories = aggregate(&team.players, categories, settings);
        debug!(team = %team.name, players = team.players.len(), "aggregated team");
        teams.push(team);

        pace(started, settings.rate_floor).await;
    }
    info!("Aggregated {} teams", teams.len());
    Ok(teams)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
