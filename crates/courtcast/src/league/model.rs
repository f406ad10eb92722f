// Players and teams as the engine sees them.

use std::collections::BTreeMap;

use crate::feed::RosterPlayer;
use crate::stats::CategoryMap;

/// A resolved player with their projected category distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    /// Stats-provider id used for game logs and snapshots.
    pub stats_id: u32,
    /// Fantasy-platform id used to match rosters.
    pub platform_id: String,
    pub position: String,
    pub status: Option<String>,
    pub injured: bool,
    /// Lineup slot, set when the player is placed on a team.
    pub slot: Option<String>,
    pub categories: CategoryMap,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        stats_id: u32,
        platform_id: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stats_id,
            platform_id: platform_id.into(),
            position: position.into(),
            status: None,
            injured: false,
            slot: None,
            categories: CategoryMap::new(),
        }
    }

    /// Build from a platform listing once its stats id is known.
    pub fn from_roster(listing: &RosterPlayer, stats_id: u32) -> Self {
        Self {
            name: listing.full_name.trim().to_string(),
            stats_id,
            platform_id: listing.platform_id.clone(),
            position: listing.position.clone(),
            status: listing.status.clone(),
            injured: listing.injured,
            slot: None,
            categories: CategoryMap::new(),
        }
    }

    pub fn with_slot(mut self, slot: Option<String>) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }
}

/// A fantasy team: its roster, weekly aggregate, and category ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    pub players: Vec<Player>,
    pub categories: CategoryMap,
    /// Category key (or percentage label) -> 1-based rank.
    pub ranks: BTreeMap<String, usize>,
}

impl Team {
    pub fn new(team_id: impl Into<String>, name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            team_id: team_id.into(),
            name: name.into(),
            players,
            categories: CategoryMap::new(),
            ranks: BTreeMap::new(),
        }
    }

    pub fn rank(&self, key: &str) -> Option<usize> {
        self.ranks.get(key).copied()
    }
}
