// Stats-provider player directory and fuzzy identity resolution.
//
// Fantasy platforms and stats providers spell names differently
// ("Jaren Jackson Jr." vs "Jaren Jackson"), so a platform name is matched
// exactly first and then on a normalized form.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::FeedError;

/// Generational suffixes ignored by the normalized comparison.
const NAME_SUFFIXES: [&str; 5] = ["Jr", "Sr", "II", "III", "IV"];

/// One entry of the stats provider's player list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    pub id: u32,
    pub full_name: String,
}

/// Name -> stats-provider id lookup.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    exact: HashMap<String, u32>,
    normalized: HashMap<String, u32>,
}

/// Strip periods, generational suffixes, and spaces; compare without case.
///
/// `"Jaren Jackson Jr."` and `"jaren jackson"` both become `"jarenjackson"`.
pub fn normalize_name(name: &str) -> String {
    let without_periods = name.replace('.', "");
    without_periods
        .split_whitespace()
        .filter(|token| !NAME_SUFFIXES.iter().any(|s| s.eq_ignore_ascii_case(token)))
        .collect::<String>()
        .to_ascii_lowercase()
}

impl PlayerDirectory {
    pub fn new(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let mut directory = PlayerDirectory::default();
        for entry in entries {
            let name = entry.full_name.trim().to_string();
            if directory.exact.contains_key(&name) {
                warn!("duplicate directory entry for '{}', using latest id {}", name, entry.id);
            }
            directory.normalized.insert(normalize_name(&name), entry.id);
            directory.exact.insert(name, entry.id);
        }
        directory
    }

    /// Load a directory CSV with `id,full_name` columns.
    pub fn from_path(path: &Path) -> Result<Self, FeedError> {
        let file = std::fs::File::open(path).map_err(|e| FeedError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file).map_err(|e| FeedError::Csv {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_reader(rdr);
        let entries = reader
            .deserialize::<DirectoryEntry>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Resolve a display name to a stats id: exact match first, then the
    /// normalized form. `None` means the player cannot be projected.
    pub fn resolve(&self, full_name: &str) -> Option<u32> {
        let name = full_name.trim();
        self.exact
            .get(name)
            .or_else(|| self.normalized.get(&normalize_name(name)))
            .copied()
    }
}
