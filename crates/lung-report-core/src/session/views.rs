//! Legend and totals display models.
//!
//! Both are built once per palette as typed row lists; later updates write
//! into the existing rows by position.

use serde::{Deserialize, Serialize};

use crate::models::{Palette, Region, Rgb, SeverityLevel, Tally};

use super::RegionRenderer;

pub const LEGEND_HEADING: &str = "Legend";
pub const TOTALS_HEADING: &str = "Totals";
pub const TOTALS_SUBHEADING: &str = "Pathological areas:";

/// A color swatch with its caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendRow {
    pub color: Rgb,
    pub label: String,
}

/// Key of the diagram colors, one row per palette level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub rows: Vec<LegendRow>,
}

impl Legend {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            rows: palette
                .levels()
                .iter()
                .map(|level| LegendRow {
                    color: level.color,
                    label: level.label.clone(),
                })
                .collect(),
        }
    }
}

/// A color swatch with the number of regions at that level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRow {
    pub color: Rgb,
    pub count: u32,
}

/// Per-level counts, one row per scored level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsView {
    pub rows: Vec<TotalsRow>,
    /// Regions above baseline
    pub pathological: u32,
}

impl TotalsView {
    /// Zeroed rows for every scored level.
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            rows: palette
                .scored_levels()
                .iter()
                .map(|level| TotalsRow {
                    color: level.color,
                    count: 0,
                })
                .collect(),
            pathological: 0,
        }
    }

    /// Copy counts into the rows. Rows beyond the tally are zeroed.
    pub fn set_counts(&mut self, tally: &Tally) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.count = tally.get(index).unwrap_or(0);
        }
        self.pathological = tally.pathological();
    }

    pub fn counts(&self) -> Vec<u32> {
        self.rows.iter().map(|row| row.count).collect()
    }
}

impl RegionRenderer for TotalsView {
    fn render_region(&mut self, _region: &Region, _level: &SeverityLevel) {}

    fn render_totals(&mut self, tally: &Tally) {
        self.set_counts(tally);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_lists_every_level() {
        let legend = Legend::from_palette(&Palette::default());
        let labels: Vec<&str> = legend.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Score 0", "Score 1", "Score 2", "Score 3", "Not measured"]
        );
    }

    #[test]
    fn test_totals_skip_not_measured() {
        let totals = TotalsView::from_palette(&Palette::default());
        assert_eq!(totals.rows.len(), 4);
        assert_eq!(totals.counts(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_set_counts() {
        let mut totals = TotalsView::from_palette(&Palette::default());
        totals.set_counts(&Tally::from(vec![5, 4, 3, 1]));
        assert_eq!(totals.counts(), vec![5, 4, 3, 1]);
        assert_eq!(totals.pathological, 8);

        totals.set_counts(&Tally::from(vec![2]));
        assert_eq!(totals.counts(), vec![2, 0, 0, 0]);
        assert_eq!(totals.pathological, 0);
    }
}
