// League-level evaluation: team aggregation, rankings, and matchups.

pub mod aggregate;
pub mod matchup;
pub mod model;
pub mod ranking;

pub use aggregate::{aggregate, AggregationSettings};
pub use model::{Player, Team};
pub use ranking::rank_categories;
