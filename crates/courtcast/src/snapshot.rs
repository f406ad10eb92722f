// JSON snapshots of projected player distributions.
//
// Wire format, keyed by stats-provider id:
//
//   { "2544": { "PTS": { "mean": 24.1, "variance": 31.7 }, ... }, ... }
//
// An empty distribution is stored with both fields null.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::league::Player;
use crate::stats::{CategoryMap, Distribution};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("snapshot has no entry for player {name} ({stats_id})")]
    MissingPlayer { stats_id: u32, name: String },

    #[error("snapshot entry for player {stats_id} has no category `{category}`")]
    MissingCategory { stats_id: u32, category: String },
}

/// Stored parameters of one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub mean: Option<f64>,
    pub variance: Option<f64>,
}

impl From<&Distribution> for SnapshotEntry {
    fn from(d: &Distribution) -> Self {
        SnapshotEntry {
            mean: d.mean(),
            variance: d.variance(),
        }
    }
}

impl SnapshotEntry {
    pub fn to_distribution(&self) -> Distribution {
        Distribution::from_parameters(None, self.mean, self.variance, None)
    }
}

/// Every player's category distributions, keyed by stats id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    players: BTreeMap<String, BTreeMap<String, SnapshotEntry>>,
}

impl Snapshot {
    pub fn capture(players: &[Player]) -> Self {
        let players = players
            .iter()
            .map(|p| {
                let categories = p
                    .categories
                    .iter()
                    .map(|(k, d)| (k.clone(), SnapshotEntry::from(d)))
                    .collect();
                (p.stats_id.to_string(), categories)
            })
            .collect();
        Snapshot { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_err = |e: std::io::Error| SnapshotError::Io {
            path: path.display().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(io_err)?;
        info!("Saved snapshot of {} players to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| SnapshotError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Replace each player's distributions with the stored ones.
    ///
    /// The snapshot must cover every player and every tracked category; any
    /// gap is an error and no player is modified.
    pub fn restore(&self, players: &mut [Player], categories: &[String]) -> Result<(), SnapshotError> {
        let mut restored = Vec::with_capacity(players.len());
        for player in players.iter() {
            let stored = self
                .players
                .get(&player.stats_id.to_string())
                .ok_or_else(|| SnapshotError::MissingPlayer {
                    stats_id: player.stats_id,
                    name: player.name.clone(),
                })?;
            let dists = categories
                .iter()
                .map(|category| {
                    stored
                        .get(category)
                        .map(|entry| (category.clone(), entry.to_distribution()))
                        .ok_or_else(|| SnapshotError::MissingCategory {
                            stats_id: player.stats_id,
                            category: category.clone(),
                        })
                })
                .collect::<Result<CategoryMap, _>>()?;
            restored.push(dists);
        }
        for (player, dists) in players.iter_mut().zip(restored) {
            player.categories = dists;
        }
        Ok(())
    }
}
