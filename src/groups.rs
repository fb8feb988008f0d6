use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{GroupConfigError, SortError, SortResult};

pub const DEFAULT_WEST: [&str; 2] = ["california", "oregon"];
pub const DEFAULT_EAST: [&str; 2] = ["maryland", "new_york"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coast {
    West,
    East,
}

/// Location membership for the two coasts.
///
/// Matching is exact and case-sensitive. A location listed under both
/// coasts is classified as west.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoastGroups {
    west: BTreeSet<String>,
    east: BTreeSet<String>,
}

impl Default for CoastGroups {
    fn default() -> Self {
        CoastGroups::new(DEFAULT_WEST, DEFAULT_EAST)
    }
}

impl CoastGroups {
    pub fn new<W, E>(west: W, east: E) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let groups = CoastGroups {
            west: west.into_iter().map(Into::into).collect(),
            east: east.into_iter().map(Into::into).collect(),
        };
        groups.warn_on_overlap();
        groups
    }

    /// Parses `{"west": [...], "east": [...]}`.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let groups: CoastGroups = serde_json::from_str(text)?;
        groups.warn_on_overlap();
        Ok(groups)
    }

    pub fn from_json_file(path: &Path) -> SortResult<Self> {
        let load = || -> Result<Self, GroupConfigError> {
            let text = fs::read_to_string(path)?;
            Ok(Self::from_json_str(&text)?)
        };
        load().map_err(|source| SortError::GroupConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn classify(&self, location: &str) -> Option<Coast> {
        if self.west.contains(location) {
            Some(Coast::West)
        } else if self.east.contains(location) {
            Some(Coast::East)
        } else {
            None
        }
    }

    pub fn west(&self) -> impl Iterator<Item = &str> {
        self.west.iter().map(String::as_str)
    }

    pub fn east(&self) -> impl Iterator<Item = &str> {
        self.east.iter().map(String::as_str)
    }

    fn warn_on_overlap(&self) {
        for location in self.west.intersection(&self.east) {
            warn!("Location {:?} is listed under both coasts; treating it as west", location);
        }
    }
}
