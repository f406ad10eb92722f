// Player projection: game logs in, blended category distributions out.

pub mod player;
pub mod samples;

pub use player::{PlayerProjector, ProjectionSettings, DEFAULT_RATE_FLOOR};
pub use samples::{BreakdownTable, Breakdowns, SampleAccumulator, DEFAULT_MIN_MINUTES};
