//! Random severity assignment and tally aggregation.
//!
//! Pipeline: Catalog × Palette → draw one level per region → Assignment → Tally

mod source;

pub use source::*;

use serde::{Deserialize, Serialize};

use crate::models::{Assignment, Palette, Region, Tally};

/// Which levels a draw may land on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawPolicy {
    /// Draw over every level, "not measured" included.
    #[default]
    IncludeNotMeasured,
    /// Draw only over scored levels; "not measured" is never assigned.
    ScoredOnly,
}

impl DrawPolicy {
    /// Exclusive upper bound of the draw for a palette.
    ///
    /// A palette holding only the "not measured" level has nothing to score,
    /// so `ScoredOnly` falls back to that single level.
    pub fn upper_bound(&self, palette: &Palette) -> usize {
        match self {
            DrawPolicy::IncludeNotMeasured => palette.len(),
            DrawPolicy::ScoredOnly => palette.scored_len().max(1),
        }
    }
}

/// Produces fresh assignments from an injected random source.
pub struct ReportGenerator<S> {
    source: S,
    policy: DrawPolicy,
}

impl<S: RandomSource> ReportGenerator<S> {
    /// Create a generator with the default draw policy.
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: DrawPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DrawPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DrawPolicy {
        self.policy
    }

    /// Assign every region an independently drawn level and count the result.
    ///
    /// Regions keep their input order in the assignment. An empty region list
    /// yields an empty assignment and an all-zero tally.
    pub fn generate(&mut self, regions: &[Region], palette: &Palette) -> (Assignment, Tally) {
        debug_assert!(!palette.is_empty(), "palette must not be empty");

        let upper = self.policy.upper_bound(palette);
        let mut assignment = Assignment::with_capacity(regions.len());

        for region in regions {
            let drawn = self.source.next_index(upper);
            debug_assert!(drawn < upper, "random source returned {drawn} for bound {upper}");
            let index = drawn.min(upper - 1);
            let level = palette.levels()[index].clone();
            assignment.insert(region.clone(), level);
        }

        let counts = tally(&assignment, palette);
        (assignment, counts)
    }
}

/// Count how many regions hold each scored level.
///
/// "Not measured" entries are not counted, and neither are levels that do
/// not match the palette entry at their ordinal.
pub fn tally(assignment: &Assignment, palette: &Palette) -> Tally {
    let mut counts = Tally::zeroed(palette.scored_len());
    for score in assignment.iter() {
        let index = score.level.index;
        if index < palette.scored_len() && palette.level(index) == Some(&score.level) {
            counts.increment(index);
        }
    }
    counts
}
