//! Region catalog models.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of regions in the default lung diagram.
pub const LUNG_AREA_COUNT: usize = 14;

/// Catalog errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate region identifier: {0}")]
    Duplicate(String),

    #[error("Empty region identifier at position {0}")]
    EmptyIdentifier(usize),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// An anatomical zone of the diagram, identified by its drawing tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Region {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Region {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Ordered, duplicate-free set of regions.
///
/// Order only matters for display: the diagram, the console output and the
/// PDF all list regions in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Build a catalog from identifiers, rejecting blanks and duplicates.
    pub fn new<I, S>(ids: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut regions = Vec::new();

        for (position, id) in ids.into_iter().enumerate() {
            let id: String = id.into();
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(CatalogError::EmptyIdentifier(position));
            }
            if !seen.insert(id.clone()) {
                return Err(CatalogError::Duplicate(id));
            }
            regions.push(Region(id));
        }

        Ok(Self { regions })
    }

    /// The fourteen `lung_area_N` zones of the lung diagram.
    pub fn lung_areas() -> Self {
        Self {
            regions: default_region_ids().into_iter().map(Region).collect(),
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn contains(&self, region: &Region) -> bool {
        self.regions.contains(region)
    }

    /// Display position of a region.
    pub fn position(&self, region: &Region) -> Option<usize> {
        self.regions.iter().position(|r| r == region)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::lung_areas()
    }
}

/// Identifiers of the default diagram, `lung_area_1` through `lung_area_14`.
pub fn default_region_ids() -> Vec<String> {
    (1..=LUNG_AREA_COUNT)
        .map(|n| format!("lung_area_{}", n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lung_areas_catalog() {
        let catalog = RegionCatalog::lung_areas();
        assert_eq!(catalog.len(), LUNG_AREA_COUNT);
        assert_eq!(catalog.regions()[0].as_str(), "lung_area_1");
        assert_eq!(catalog.regions()[13].as_str(), "lung_area_14");
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = RegionCatalog::new(["a", "b", "a"]);
        assert_eq!(result, Err(CatalogError::Duplicate("a".into())));
    }

    #[test]
    fn test_rejects_blank_identifier() {
        let result = RegionCatalog::new(["a", "  "]);
        assert_eq!(result, Err(CatalogError::EmptyIdentifier(1)));
    }

    #[test]
    fn test_empty_catalog_is_allowed() {
        let catalog = RegionCatalog::new(Vec::<String>::new()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_position_follows_input_order() {
        let catalog = RegionCatalog::new(["upper", "middle", "lower"]).unwrap();
        assert_eq!(catalog.position(&Region::from("lower")), Some(2));
        assert_eq!(catalog.position(&Region::from("missing")), None);
        assert!(catalog.contains(&Region::from("middle")));
    }
}
