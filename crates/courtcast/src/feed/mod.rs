// External data feeds: game logs, league rosters, and player identity.
//
// The engine only talks to these through the `StatsFeed` and `RosterFeed`
// traits. File-backed implementations are provided so runs can be replayed
// offline from exported data.

pub mod directory;
pub mod gamelog;
pub mod roster;

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

pub use directory::PlayerDirectory;
pub use gamelog::{CsvStatsFeed, GameRecord, Location, Season};
pub use roster::{JsonRosterFeed, RosterEntry, RosterPlayer, TeamSummary};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("malformed feed data: {0}")]
    Malformed(String),

    #[error("unknown team id `{0}`")]
    UnknownTeam(String),
}

// ---------------------------------------------------------------------------
// Feed traits
// ---------------------------------------------------------------------------

/// Per-game box-score logs from a stats provider.
#[async_trait]
pub trait StatsFeed: Send + Sync {
    /// Every game `player_id` played in `season`, in the provider's order.
    async fn game_log(&self, player_id: u32, season: Season) -> Result<Vec<GameRecord>, FeedError>;
}

/// League players and team rosters from a fantasy platform.
#[async_trait]
pub trait RosterFeed: Send + Sync {
    /// All players known to the league.
    async fn players(&self) -> Result<Vec<RosterPlayer>, FeedError>;

    /// The league's teams, in platform order.
    async fn teams(&self) -> Result<Vec<TeamSummary>, FeedError>;

    /// The players rostered by one team, each with their lineup slot.
    async fn team_roster(&self, team_id: &str) -> Result<Vec<RosterEntry>, FeedError>;
}

// ---------------------------------------------------------------------------
// Request pacing
// ---------------------------------------------------------------------------

/// Wait until at least `floor` has elapsed since `started`.
///
/// Returns immediately when the work already took longer. The wait is bounded
/// by `floor` and is not interrupted by cancellation.
pub async fn pace(started: Instant, floor: Duration) {
    tokio::time::sleep_until(started + floor).await;
}
