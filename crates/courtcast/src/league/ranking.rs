// Per-category team rankings.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::stats::{scoring, Scoring};

use super::model::Team;

/// Rank positions for a list of sort keys.
///
/// Returns the 1-based rank of each input position. Teams without a finite
/// key (no data, an undefined ratio, or NaN) rank after every team that has
/// one. The sort is stable, so equal keys keep their input order.
pub fn rank_order(keys: &[Option<f64>], descending: bool) -> Vec<usize> {
    let keys: Vec<Option<f64>> = keys.iter().map(|k| k.filter(|v| v.is_finite())).collect();
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| match (keys[a], keys[b]) {
        (Some(x), Some(y)) => {
            let ord = x.total_cmp(&y);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut ranks = vec![0; keys.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}

fn category_mean(team: &Team, category: &str) -> Option<f64> {
    team.categories.get(category).and_then(|d| d.mean())
}

/// `makes / attempts` on the teams' means. Undefined when either side has no
/// data or attempts are not positive.
fn category_ratio(team: &Team, makes: &str, attempts: &str) -> Option<f64> {
    let made = category_mean(team, makes)?;
    let tried = category_mean(team, attempts)?;
    (tried > 0.0).then(|| made / tried)
}

/// Write 1-based ranks into every team's `ranks` map.
///
/// Direct categories rank by descending mean, inverse ones by ascending
/// mean. Ratio categories rank by descending `makes / attempts` and are
/// stored under their percentage label. Categories without a scoring rule are
/// not ranked, and neither is a ratio whose attempts category is untracked.
pub fn rank_categories(teams: &mut [Team], categories: &[String]) {
    for category in categories {
        let Some(rule) = scoring(category) else {
            debug!("category {} has no ranking rule, skipping", category);
            continue;
        };

        let (label, keys, descending): (String, Vec<Option<f64>>, bool) = match rule {
            Scoring::Direct => (
                category.clone(),
                teams.iter().map(|t| category_mean(t, category)).collect(),
                true,
            ),
            Scoring::Inverse => (
                category.clone(),
                teams.iter().map(|t| category_mean(t, category)).collect(),
                false,
            ),
            Scoring::Ratio { attempts, label } => {
                if !categories.iter().any(|c| c == attempts) {
                    warn!(
                        "cannot rank {}: attempts category {} is not tracked",
                        label, attempts
                    );
                    continue;
                }
                (
                    label.to_string(),
                    teams
                        .iter()
                        .map(|t| category_ratio(t, category, attempts))
                        .collect(),
                    true,
                )
            }
        };

        let ranks = rank_order(&keys, descending);
        for (team, rank) in teams.iter_mut().zip(ranks) {
            team.ranks.insert(label.clone(), rank);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
