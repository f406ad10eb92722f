// Category keys and the fixed ranking-direction table.

use std::collections::BTreeMap;

use super::distribution::Distribution;

/// Category key -> distribution, ordered by key for deterministic output.
pub type CategoryMap = BTreeMap<String, Distribution>;

pub const POINTS: &str = "PTS";
pub const REBOUNDS: &str = "REB";
pub const ASSISTS: &str = "AST";
pub const STEALS: &str = "STL";
pub const BLOCKS: &str = "BLK";
pub const TURNOVERS: &str = "TOV";
pub const THREES_MADE: &str = "FG3M";
pub const FIELD_GOALS_MADE: &str = "FGM";
pub const FIELD_GOALS_ATTEMPTED: &str = "FGA";
pub const FREE_THROWS_MADE: &str = "FTM";
pub const FREE_THROWS_ATTEMPTED: &str = "FTA";
pub const FIELD_GOAL_PCT: &str = "FG_PCT";
pub const FREE_THROW_PCT: &str = "FT_PCT";

/// The standard nine-category tracking set, with both makes and attempts
/// kept so the percentages can be derived.
pub const DEFAULT_CATEGORIES: [&str; 11] = [
    POINTS,
    REBOUNDS,
    ASSISTS,
    STEALS,
    BLOCKS,
    TURNOVERS,
    THREES_MADE,
    FIELD_GOALS_MADE,
    FIELD_GOALS_ATTEMPTED,
    FREE_THROWS_MADE,
    FREE_THROWS_ATTEMPTED,
];

/// How a category is won in a head-to-head week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Higher mean wins.
    Direct,
    /// Lower mean wins.
    Inverse,
    /// Ranked by `makes / attempts`, higher wins, under a percentage label.
    Ratio {
        attempts: &'static str,
        label: &'static str,
    },
}

/// Look up how `category` is scored. Categories outside the table (including
/// attempts on their own) are not ranked and return `None`.
pub fn scoring(category: &str) -> Option<Scoring> {
    match category {
        POINTS | REBOUNDS | ASSISTS | STEALS | BLOCKS | THREES_MADE => Some(Scoring::Direct),
        TURNOVERS => Some(Scoring::Inverse),
        FIELD_GOALS_MADE => Some(Scoring::Ratio {
            attempts: FIELD_GOALS_ATTEMPTED,
            label: FIELD_GOAL_PCT,
        }),
        FREE_THROWS_MADE => Some(Scoring::Ratio {
            attempts: FREE_THROWS_ATTEMPTED,
            label: FREE_THROW_PCT,
        }),
        _ => None,
    }
}
