//! Region assignments and per-level tallies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::region::Region;
use super::severity::SeverityLevel;

/// A single region with the level it currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionScore {
    pub region: Region,
    pub level: SeverityLevel,
}

/// Region → level mapping for one generation.
///
/// Holds at most one entry per region and keeps insertion order, which is
/// catalog order when produced by the generator. Serialized as the plain
/// list of scores; duplicates in a deserialized list collapse to the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RegionScore>", into = "Vec<RegionScore>")]
pub struct Assignment {
    scores: Vec<RegionScore>,
    /// Region → position in `scores`
    positions: HashMap<Region, usize>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            scores: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Set the level for a region, replacing any previous entry.
    pub fn insert(&mut self, region: Region, level: SeverityLevel) {
        match self.positions.get(&region) {
            Some(&position) => self.scores[position].level = level,
            None => {
                self.positions.insert(region.clone(), self.scores.len());
                self.scores.push(RegionScore { region, level });
            }
        }
    }

    pub fn get(&self, region: &Region) -> Option<&SeverityLevel> {
        self.positions
            .get(region)
            .map(|&position| &self.scores[position].level)
    }

    pub fn scores(&self) -> &[RegionScore] {
        &self.scores
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionScore> {
        self.scores.iter()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.scores.iter().map(|s| &s.region)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of regions holding the level with the given ordinal.
    pub fn count_at(&self, index: usize) -> usize {
        self.scores.iter().filter(|s| s.level.index == index).count()
    }
}

impl From<Vec<RegionScore>> for Assignment {
    fn from(scores: Vec<RegionScore>) -> Self {
        let mut assignment = Self::with_capacity(scores.len());
        for score in scores {
            assignment.insert(score.region, score.level);
        }
        assignment
    }
}

impl From<Assignment> for Vec<RegionScore> {
    fn from(assignment: Assignment) -> Self {
        assignment.scores
    }
}

/// Counts of regions per scored level (baseline first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally {
    counts: Vec<u32>,
}

impl Tally {
    /// All-zero tally with one slot per scored level.
    pub fn zeroed(len: usize) -> Self {
        Self {
            counts: vec![0; len],
        }
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.counts.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Regions holding any scored level.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Regions above baseline.
    pub fn pathological(&self) -> u32 {
        self.counts.iter().skip(1).sum()
    }

    pub(crate) fn increment(&mut self, index: usize) {
        if let Some(slot) = self.counts.get_mut(index) {
            *slot += 1;
        }
    }
}

impl From<Vec<u32>> for Tally {
    fn from(counts: Vec<u32>) -> Self {
        Self { counts }
    }
}
