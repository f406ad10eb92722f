// Per-season sample accumulation and opponent/location breakdown tables.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::feed::{GameRecord, Location, Season};
use crate::stats::{CategoryMap, Distribution};

/// Minutes below which a game is treated as noise (garbage time, early
/// injury exits) and dropped.
pub const DEFAULT_MIN_MINUTES: f64 = 7.0;

// ---------------------------------------------------------------------------
// Breakdown tables
// ---------------------------------------------------------------------------

/// Raw observed values keyed by `[key][category][position]`.
///
/// Cells are created on first write, so a table only contains keys that were
/// actually observed. Reads of unobserved cells return an empty slice.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownTable<K: Ord> {
    cells: BTreeMap<K, BTreeMap<String, BTreeMap<String, Vec<f64>>>>,
}

impl<K: Ord> Default for BreakdownTable<K> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<K: Ord> BreakdownTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: K, category: &str, position: &str, value: f64) {
        self.cells
            .entry(key)
            .or_default()
            .entry(category.to_string())
            .or_default()
            .entry(position.to_string())
            .or_default()
            .push(value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.cells.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Values for one cell.
    pub fn position_values<Q>(&self, key: &Q, category: &str, position: &str) -> &[f64]
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cells
            .get(key)
            .and_then(|cats| cats.get(category))
            .and_then(|positions| positions.get(position))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Values for `[key][category]` across all positions, in position order.
    pub fn values<Q>(&self, key: &Q, category: &str) -> Vec<f64>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cells
            .get(key)
            .and_then(|cats| cats.get(category))
            .map(|positions| positions.values().flatten().copied().collect())
            .unwrap_or_default()
    }

    pub fn distribution<Q>(&self, key: &Q, category: &str) -> Distribution
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Distribution::from_samples(&self.values(key, category))
    }

    pub fn position_distribution<Q>(&self, key: &Q, category: &str, position: &str) -> Distribution
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Distribution::from_samples(self.position_values(key, category, position))
    }

    /// Fold another table into this one, appending cell by cell. Lets
    /// independent workers fill private tables and combine them afterwards.
    pub fn merge(&mut self, other: BreakdownTable<K>) {
        for (key, categories) in other.cells {
            let mine = self.cells.entry(key).or_default();
            for (category, positions) in categories {
                let mine = mine.entry(category).or_default();
                for (position, values) in positions {
                    mine.entry(position).or_default().extend(values);
                }
            }
        }
    }
}

/// The two side tables filled while projecting players.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdowns {
    /// Keyed by opponent abbreviation, e.g. `BOS`.
    pub vs_opponent: BreakdownTable<String>,
    pub by_location: BreakdownTable<Location>,
}

impl Breakdowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: Breakdowns) {
        self.vs_opponent.merge(other.vs_opponent);
        self.by_location.merge(other.by_location);
    }
}

// ---------------------------------------------------------------------------
// Sample accumulator
// ---------------------------------------------------------------------------

/// Collects one player's per-category samples for one season.
#[derive(Debug)]
pub struct SampleAccumulator<'a> {
    player: &'a str,
    season: Season,
    categories: &'a [String],
    min_minutes: f64,
    samples: BTreeMap<String, Vec<f64>>,
    games_seen: usize,
}

impl<'a> SampleAccumulator<'a> {
    pub fn new(player: &'a str, season: Season, categories: &'a [String], min_minutes: f64) -> Self {
        let samples = categories.iter().map(|c| (c.clone(), Vec::new())).collect();
        Self {
            player,
            season,
            categories,
            min_minutes,
            samples,
            games_seen: 0,
        }
    }

    /// Add one game. Returns `Ok(false)` when the game is below the minutes
    /// floor and was skipped.
    ///
    /// Every tracked category is checked before anything is written, so a
    /// malformed record leaves the accumulator and breakdowns untouched.
    pub fn record(
        &mut self,
        game: &GameRecord,
        position: &str,
        breakdowns: Option<&mut Breakdowns>,
    ) -> Result<bool, EngineError> {
        let index = self.games_seen;
        self.games_seen += 1;

        if game.minutes < self.min_minutes {
            return Ok(false);
        }

        let mut values = Vec::with_capacity(self.categories.len());
        for category in self.categories {
            let value = game
                .stats
                .get(category)
                .copied()
                .ok_or_else(|| EngineError::MissingCategory {
                    player: self.player.to_string(),
                    season: self.season,
                    category: category.clone(),
                    game: index,
                })?;
            values.push((category, value));
        }

        let mut breakdowns = breakdowns;
        for (category, value) in values {
            self.samples.entry(category.clone()).or_default().push(value);
            if let Some(tables) = breakdowns.as_deref_mut() {
                tables
                    .vs_opponent
                    .record(game.opponent.clone(), category, position, value);
                tables
                    .by_location
                    .record(game.location, category, position, value);
            }
        }
        Ok(true)
    }

    /// Samples collected so far for `category`.
    pub fn samples(&self, category: &str) -> &[f64] {
        self.samples.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Convert every tracked category's samples into a distribution. A
    /// category with no qualifying games maps to the empty distribution.
    pub fn into_distributions(self) -> CategoryMap {
        self.samples
            .into_iter()
            .map(|(category, values)| (category, Distribution::from_samples(&values)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
