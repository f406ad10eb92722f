// Team-level weekly projections from player distributions.

use std::time::Duration;

use crate::config::Config;
use crate::projection::DEFAULT_RATE_FLOOR;
use crate::stats::{CategoryMap, Distribution};

use super::model::Player;

/// Expected games a player appears in during one scheduling week.
pub const DEFAULT_GAMES_PER_WEEK: f64 = 3.5;

/// Lineup slots whose occupants do not count toward the weekly projection.
pub const DEFAULT_INACTIVE_SLOTS: [&str; 2] = ["IL", "IL+"];

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSettings {
    pub games_per_week: f64,
    pub inactive_slots: Vec<String>,
    /// Minimum time spent per team when rosters come from a feed.
    pub rate_floor: Duration,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            games_per_week: DEFAULT_GAMES_PER_WEEK,
            inactive_slots: DEFAULT_INACTIVE_SLOTS.iter().map(|s| s.to_string()).collect(),
            rate_floor: DEFAULT_RATE_FLOOR,
        }
    }
}

impl AggregationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            games_per_week: config.league.games_per_week,
            inactive_slots: config.league.inactive_slots.clone(),
            rate_floor: Duration::from_millis(config.projection.rate_floor_ms),
        }
    }

    /// Whether `player` contributes to the weekly projection: not injured
    /// and not parked in an inactive-reserve slot.
    pub fn is_active(&self, player: &Player) -> bool {
        if player.injured {
            return false;
        }
        match &player.slot {
            Some(slot) => !self.inactive_slots.iter().any(|s| s == slot),
            None => true,
        }
    }
}

/// Sum every active player's per-game distribution, scaled to a week.
///
/// Players are folded in roster order. A category missing from a player's
/// map contributes nothing, and a team with no active players ends up with
/// empty distributions.
pub fn aggregate(players: &[Player], categories: &[String], settings: &AggregationSettings) -> CategoryMap {
    let active: Vec<&Player> = players.iter().filter(|p| settings.is_active(p)).collect();
    categories
        .iter()
        .map(|category| {
            let total: Distribution = active
                .iter()
                .map(|p| {
                    p.categories
                        .get(category)
                        .copied()
                        .unwrap_or_default()
                        .scale(settings.games_per_week)
                })
                .sum();
            (category.clone(), total)
        })
        .collect()
}
