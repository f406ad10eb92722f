// Game-log records, season identifiers, and the CSV-backed stats feed.
//
// Logs use the stats provider's export layout: one row per game with a
// MATCHUP column ("LAL vs. BOS" at home, "LAL @ BOS" away), a MIN column,
// and one numeric column per box-score category.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FeedError, StatsFeed};

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// First month of a season; games from October onward belong to the season
/// that starts that calendar year.
const SEASON_START_MONTH: u32 = 10;

/// A season identified by the year it starts, displayed as `2024-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Season {
    start_year: i32,
}

impl Season {
    pub fn starting(start_year: i32) -> Self {
        Season { start_year }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn previous(&self) -> Self {
        Season {
            start_year: self.start_year - 1,
        }
    }

    /// The season in progress (or most recently started) on `date`.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= SEASON_START_MONTH {
            Season::starting(date.year())
        } else {
            Season::starting(date.year() - 1)
        }
    }

    pub fn current() -> Self {
        Season::containing(Local::now().date_naive())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected a season like 2024-25, got `{s}`"))?;
        let start_year: i32 = start
            .parse()
            .map_err(|_| format!("invalid season start year in `{s}`"))?;
        let end_year: i32 = end
            .parse()
            .map_err(|_| format!("invalid season end year in `{s}`"))?;
        if end.len() != 2 || end_year != (start_year + 1).rem_euclid(100) {
            return Err(format!("season `{s}` does not span consecutive years"));
        }
        Ok(Season { start_year })
    }
}

// ---------------------------------------------------------------------------
// Game records
// ---------------------------------------------------------------------------

/// Where a game was played, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Home, Location::Away];
}

/// One game from a player's log.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub minutes: f64,
    pub location: Location,
    /// Opponent team abbreviation, e.g. `BOS`.
    pub opponent: String,
    /// Category key -> value for this game.
    pub stats: HashMap<String, f64>,
}

/// Split a matchup string into location and opponent.
///
/// `"LAL vs. BOS"` is a home game against BOS; `"LAL @ BOS"` is away.
pub fn parse_matchup(matchup: &str) -> Option<(Location, String)> {
    let mut parts = matchup.split_whitespace();
    let _team = parts.next()?;
    let location = match parts.next()? {
        "vs." | "vs" => Location::Home,
        "@" => Location::Away,
        _ => return None,
    };
    let opponent = parts.next()?.to_string();
    if parts.next().is_some() {
        return None;
    }
    Some((location, opponent))
}

/// Parse a minutes value, either decimal (`34.5`) or clock style (`34:12`).
fn parse_minutes(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let minutes = match raw.split_once(':') {
        Some((m, s)) => m.parse::<f64>().ok()? + s.parse::<f64>().ok()? / 60.0,
        None => raw.parse::<f64>().ok()?,
    };
    minutes.is_finite().then_some(minutes)
}

const MATCHUP_COLUMN: &str = "MATCHUP";
const MINUTES_COLUMN: &str = "MIN";

fn load_game_log_from_reader<R: Read>(rdr: R, label: &str) -> Result<Vec<GameRecord>, FeedError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut games = Vec::new();
    for (index, result) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row = result.map_err(|e| FeedError::Csv {
            path: label.to_string(),
            source: e,
        })?;

        let matchup = row.get(MATCHUP_COLUMN).ok_or_else(|| {
            FeedError::Malformed(format!("{label}: row {index} has no {MATCHUP_COLUMN} column"))
        })?;
        let (location, opponent) = parse_matchup(matchup).ok_or_else(|| {
            FeedError::Malformed(format!("{label}: row {index} has unreadable matchup `{matchup}`"))
        })?;
        let minutes = row
            .get(MINUTES_COLUMN)
            .and_then(|m| parse_minutes(m))
            .ok_or_else(|| {
                FeedError::Malformed(format!("{label}: row {index} has missing or invalid minutes"))
            })?;

        // Every other numeric column is a category value; dates, W/L flags
        // and blanks are not.
        let stats = row
            .iter()
            .filter(|(k, _)| k.as_str() != MATCHUP_COLUMN && k.as_str() != MINUTES_COLUMN)
            .filter_map(|(k, v)| {
                let value = v.trim().parse::<f64>().ok()?;
                value.is_finite().then(|| (k.trim().to_string(), value))
            })
            .collect();

        games.push(GameRecord {
            minutes,
            location,
            opponent,
            stats,
        });
    }
    Ok(games)
}

// ---------------------------------------------------------------------------
// CSV stats feed
// ---------------------------------------------------------------------------

/// Reads `<root>/<season>/<player_id>.csv`.
///
/// A missing file means the player logged no games that season and yields an
/// empty log. Any other read or parse failure is an error.
#[derive(Debug, Clone)]
pub struct CsvStatsFeed {
    root: PathBuf,
}

impl CsvStatsFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn log_path(&self, player_id: u32, season: Season) -> PathBuf {
        self.root
            .join(season.to_string())
            .join(format!("{player_id}.csv"))
    }
}

#[async_trait]
impl StatsFeed for CsvStatsFeed {
    async fn game_log(&self, player_id: u32, season: Season) -> Result<Vec<GameRecord>, FeedError> {
        let path = self.log_path(player_id, season);
        let label = path.display().to_string();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no {season} game log for player {player_id} at {label}");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FeedError::Io {
                    path: label,
                    source: e,
                })
            }
        };
        load_game_log_from_reader(bytes.as_slice(), &label)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
