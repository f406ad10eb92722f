// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod error;
pub mod feed;
pub mod league;
pub mod pipeline;
pub mod projection;
pub mod snapshot;
pub mod stats;
