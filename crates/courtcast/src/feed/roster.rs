// League roster data and the JSON-backed roster feed.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{FeedError, RosterFeed};

/// A player as the fantasy platform lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub platform_id: String,
    pub full_name: String,
    /// Primary position, e.g. `PG` or `C`.
    pub position: String,
    /// Raw platform status (`INJ`, `O`, `GTD`, ...), if any.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub injured: bool,
}

/// A team id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_id: String,
    pub name: String,
}

/// One rostered player and the lineup slot they occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub platform_id: String,
    /// Lineup slot, e.g. `PG`, `UTIL`, `BN`, `IL`, `IL+`.
    #[serde(default)]
    pub slot: Option<String>,
}

// ---------------------------------------------------------------------------
// JSON roster feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    players: Vec<RosterPlayer>,
    teams: Vec<TeamFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamFile {
    team_id: String,
    name: String,
    #[serde(default)]
    roster: Vec<RosterEntry>,
}

/// Serves a league exported as a single JSON document:
///
/// ```json
/// { "players": [{ "platform_id": "p1", "full_name": "...", "position": "PG" }],
///   "teams": [{ "team_id": "1", "name": "...", "roster": [{ "platform_id": "p1", "slot": "PG" }] }] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonRosterFeed {
    league: LeagueFile,
}

impl JsonRosterFeed {
    pub fn from_path(path: &Path) -> Result<Self, FeedError> {
        let text = std::fs::read_to_string(path).map_err(|e| FeedError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&text).map_err(|e| FeedError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let league: LeagueFile = serde_json::from_str(text)?;
        Ok(Self { league })
    }
}

#[async_trait]
impl RosterFeed for JsonRosterFeed {
    async fn players(&self) -> Result<Vec<RosterPlayer>, FeedError> {
        Ok(self.league.players.clone())
    }

    async fn teams(&self) -> Result<Vec<TeamSummary>, FeedError> {
        Ok(self
            .league
            .teams
            .iter()
            .map(|t| TeamSummary {
                team_id: t.team_id.clone(),
                name: t.name.clone(),
            })
            .collect())
    }

    async fn team_roster(&self, team_id: &str) -> Result<Vec<RosterEntry>, FeedError> {
        self.league
            .teams
            .iter()
            .find(|t| t.team_id == team_id)
            .map(|t| t.roster.clone())
            .ok_or_else(|| FeedError::UnknownTeam(team_id.to_string()))
    }
}
