// Statistical core: distributions and category definitions.

pub mod category;
pub mod distribution;

pub use category::{scoring, CategoryMap, Scoring};
pub use distribution::{Distribution, Gaussian};
