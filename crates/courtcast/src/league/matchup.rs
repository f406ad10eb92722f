// Head-to-head category outlooks between two teams.
//
// The week's margin in a category is `team - opponent`. Both aggregates are
// normal approximations, so the margin is normal too and the chance of
// winning the category is a normal CDF evaluation.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::stats::{scoring, Distribution, Scoring};

use super::model::Team;

/// Chance that one team wins a single category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutlook {
    pub category: String,
    /// `None` when either team has no projection for the category.
    pub win_probability: Option<f64>,
}

/// Probability that the margin `diff` lands on the winning side.
fn win_probability(diff: &Distribution, higher_wins: bool) -> Option<f64> {
    let g = diff.gaussian()?;
    let sd = g.std_dev();
    let p_positive = if sd > 0.0 && sd.is_finite() {
        let margin = Normal::new(g.mean, sd).ok()?;
        1.0 - margin.cdf(0.0)
    } else if g.mean > 0.0 {
        1.0
    } else if g.mean < 0.0 {
        0.0
    } else {
        0.5
    };
    Some(if higher_wins { p_positive } else { 1.0 - p_positive })
}

/// Per-category outlooks for `team` against `opponent`.
///
/// Only direct and inverse categories have a margin distribution; ratio
/// categories and unranked categories are left out.
pub fn head_to_head(team: &Team, opponent: &Team, categories: &[String]) -> Vec<CategoryOutlook> {
    categories
        .iter()
        .filter_map(|category| {
            let higher_wins = match scoring(category)? {
                Scoring::Direct => true,
                Scoring::Inverse => false,
                Scoring::Ratio { .. } => return None,
            };
            let ours = team.categories.get(category).copied().unwrap_or_default();
            let theirs = opponent.categories.get(category).copied().unwrap_or_default();
            let win_probability = if ours.is_empty() || theirs.is_empty() {
                None
            } else {
                win_probability(&ours.subtract(&theirs), higher_wins)
            };
            Some(CategoryOutlook {
                category: category.clone(),
                win_probability,
            })
        })
        .collect()
}

/// Expected number of categories won, counting only categories with a known
/// probability.
pub fn expected_category_wins(outlooks: &[CategoryOutlook]) -> f64 {
    outlooks.iter().filter_map(|o| o.win_probability).sum()
}
