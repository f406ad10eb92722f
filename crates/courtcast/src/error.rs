// Errors raised by the projection, aggregation, and ranking stages.

use crate::feed::{FeedError, Season};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A game record lacked a tracked category. The feed broke its contract,
    /// so the run stops instead of guessing a value.
    #[error("{player}: {season} game #{game} has no value for category `{category}`")]
    MissingCategory {
        player: String,
        season: Season,
        category: String,
        game: usize,
    },

    #[error("run cancelled")]
    Cancelled,
}
