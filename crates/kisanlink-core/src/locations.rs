//! Static place-name → coordinate lookup used when a farmer, item, or
//! consumer row has no stored latitude/longitude.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Coordinate};

/// One entry of the named location table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct LocationsFile {
    pub locations: Vec<NamedLocation>,
}

/// Read-only lookup table from place names to canonical coordinates.
///
/// Built once at startup and shared between request handlers behind an
/// `Arc`. Lookups never fail; an unknown name resolves to `None`.
#[derive(Debug, Clone)]
pub struct NamedLocationTable {
    entries: Vec<(NamedLocation, Coordinate)>,
    by_name: HashMap<String, usize>,
    by_first_token: HashMap<String, usize>,
}

/// The place names offered on the signup form.
const BUILTIN_LOCATIONS: [(&str, f64, f64); 4] = [
    ("Naya Thimi", 27.6943, 85.3347),
    ("Gatthaghar", 27.673_913_6, 85.373_913_2),
    ("Kausaltar", 27.674_578_7, 85.364_297_8),
    ("Lokanthali", 27.6740, 85.3450),
];

fn builtin_locations() -> Vec<NamedLocation> {
    BUILTIN_LOCATIONS
        .iter()
        .map(|&(name, latitude, longitude)| NamedLocation {
            name: name.to_string(),
            latitude,
            longitude,
        })
        .collect()
}

impl Default for NamedLocationTable {
    fn default() -> Self {
        Self::from_locations(builtin_locations()).unwrap_or_else(|e| {
            debug_assert!(false, "built-in location table is invalid: {e}");
            tracing::error!(
                error = %e,
                "built-in location table is invalid; name resolution disabled"
            );
            Self::empty()
        })
    }
}

impl NamedLocationTable {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_first_token: HashMap::new(),
        }
    }

    /// Build a table from raw entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty name, a duplicate
    /// normalized name, or an out-of-range coordinate.
    pub fn from_locations(locations: Vec<NamedLocation>) -> Result<Self, ConfigError> {
        let mut table = Self::empty();

        for location in locations {
            let key = normalize(&location.name);
            if key.is_empty() {
                return Err(ConfigError::Validation(
                    "location name must be non-empty".to_string(),
                ));
            }
            if table.by_name.contains_key(&key) {
                return Err(ConfigError::Validation(format!(
                    "duplicate location name: '{}'",
                    location.name
                )));
            }
            let coordinate = Coordinate::new(location.latitude, location.longitude).map_err(
                |e| ConfigError::Validation(format!("location '{}': {e}", location.name)),
            )?;

            let index = table.entries.len();
            if let Some(token) = first_token(&key) {
                // First entry wins on shared leading words ("Naya Thimi" vs "Naya Bazar").
                table.by_first_token.entry(token).or_insert(index);
            }
            table.by_name.insert(key, index);
            table.entries.push((location, coordinate));
        }

        Ok(table)
    }

    /// Resolve a free-text location to a coordinate.
    ///
    /// Tries the whole normalized text first, then its first
    /// whitespace-delimited token against the first token of each entry.
    #[must_use]
    pub fn resolve(&self, free_text: &str) -> Option<Coordinate> {
        let key = normalize(free_text);
        if key.is_empty() {
            return None;
        }
        if let Some(&index) = self.by_name.get(&key) {
            return Some(self.entries[index].1);
        }
        let token = first_token(&key)?;
        self.by_first_token
            .get(&token)
            .map(|&index| self.entries[index].1)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &NamedLocation> {
        self.entries.iter().map(|(location, _)| location)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load the named location table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_locations(path: &Path) -> Result<NamedLocationTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LocationsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: LocationsFile = serde_yaml::from_str(&content)?;
    NamedLocationTable::from_locations(file.locations)
}

/// Lowercase, collapse whitespace, and strip punctuation at the edges of
/// each word.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_token(normalized: &str) -> Option<String> {
    normalized.split(' ').next().map(str::to_string)
}

/// Names whose first word is already claimed by an earlier entry; these only
/// resolve by their full name.
#[must_use]
pub fn shadowed_entries(table: &NamedLocationTable) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .entries()
        .filter_map(|location| {
            let token = first_token(&normalize(&location.name))?;
            (!seen.insert(token)).then(|| location.name.clone())
        })
        .collect()
}
