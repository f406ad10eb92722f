// Two-season player projection.
//
// For each player: fetch the current and previous season logs, turn each
// season into per-category distributions, and blend them with the configured
// recency weights. Each player takes at least `rate_floor` wall-clock time so
// the stats provider is never hit faster than it allows.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::samples::{Breakdowns, SampleAccumulator, DEFAULT_MIN_MINUTES};
use crate::config::Config;
use crate::error::EngineError;
use crate::feed::{pace, GameRecord, Season, StatsFeed};
use crate::league::Player;
use crate::stats::{CategoryMap, Distribution};

/// Default minimum time spent per feed-backed unit of work (player or team).
pub const DEFAULT_RATE_FLOOR: Duration = Duration::from_millis(600);

/// Tunables for [`PlayerProjector`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSettings {
    pub current_season: Season,
    pub min_minutes: f64,
    pub weight_previous: f64,
    pub weight_current: f64,
    pub rate_floor: Duration,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            current_season: Season::current(),
            min_minutes: DEFAULT_MIN_MINUTES,
            weight_previous: 0.5,
            weight_current: 0.5,
            rate_floor: DEFAULT_RATE_FLOOR,
        }
    }
}

impl ProjectionSettings {
    pub fn from_config(config: &Config) -> Self {
        let p = &config.projection;
        Self {
            current_season: p.current_season.unwrap_or_else(Season::current),
            min_minutes: p.min_minutes,
            weight_previous: p.weight_previous,
            weight_current: p.weight_current,
            rate_floor: Duration::from_millis(p.rate_floor_ms),
        }
    }
}

/// Projects players from a [`StatsFeed`].
pub struct PlayerProjector<'a, F: StatsFeed + ?Sized> {
    feed: &'a F,
    categories: &'a [String],
    settings: ProjectionSettings,
}

impl<'a, F: StatsFeed + ?Sized> PlayerProjector<'a, F> {
    pub fn new(feed: &'a F, categories: &'a [String], settings: ProjectionSettings) -> Self {
        Self {
            feed,
            categories,
            settings,
        }
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    /// Blended per-category distributions for one player.
    ///
    /// When `breakdowns` is given, every qualifying game value from both
    /// seasons is also recorded under the player's position.
    pub async fn project(
        &self,
        player: &Player,
        breakdowns: Option<&mut Breakdowns>,
    ) -> Result<CategoryMap, EngineError> {
        let started = Instant::now();
        let current = self.settings.current_season;
        let previous = current.previous();

        let current_log = self.feed.game_log(player.stats_id, current).await?;
        let previous_log = self.feed.game_log(player.stats_id, previous).await?;

        let mut breakdowns = breakdowns;
        let previous_dists =
            self.season_distributions(player, previous, &previous_log, breakdowns.as_deref_mut())?;
        let current_dists =
            self.season_distributions(player, current, &current_log, breakdowns)?;

        let blended: CategoryMap = self
            .categories
            .iter()
            .map(|category| {
                let prev = previous_dists.get(category).copied().unwrap_or_default();
                let cur = current_dists.get(category).copied().unwrap_or_default();
                let dist = Distribution::weighted_combine(
                    &prev,
                    &cur,
                    self.settings.weight_previous,
                    self.settings.weight_current,
                );
                (category.clone(), dist)
            })
            .collect();

        debug!(
            player = %player.name,
            stats_id = player.stats_id,
            current_games = current_log.len(),
            previous_games = previous_log.len(),
            "projected player"
        );

        pace(started, self.settings.rate_floor).await;
        Ok(blended)
    }

    fn season_distributions(
        &self,
        player: &Player,
        season: Season,
        games: &[GameRecord],
        breakdowns: Option<&mut Breakdowns>,
    ) -> Result<CategoryMap, EngineError> {
        let mut acc =
            SampleAccumulator::new(&player.name, season, self.categories, self.settings.min_minutes);
        let mut breakdowns = breakdowns;
        for game in games {
            acc.record(game, &player.position, breakdowns.as_deref_mut())?;
        }
        Ok(acc.into_distributions())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
