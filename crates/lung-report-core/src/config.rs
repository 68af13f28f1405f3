//! Report configuration.
//!
//! Everything a session needs besides randomness: the title printed on the
//! report, the region catalog, the level palette, the draw policy and the
//! date format used for the acquisition date.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::DrawPolicy;
use crate::models::{
    check_date_format, default_levels, default_region_ids, CatalogError, Palette, PaletteError,
    PaletteResult, RegionCatalog, Rgb,
};

pub const DEFAULT_TITLE: &str = "COVID-19 Diagnosis Support";
pub const DEFAULT_DATE_FORMAT: &str = "%d %b %Y";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid palette: {0}")]
    Palette(#[from] PaletteError),

    #[error("Invalid date format: {0}")]
    DateFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// One palette entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelConfig {
    pub label: String,
    /// `#RRGGBB`
    pub color: String,
}

/// Session configuration, loadable from JSON with every field optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub regions: Vec<String>,
    /// Ordered levels; the last one is "not measured".
    pub levels: Vec<LevelConfig>,
    pub draw_policy: DrawPolicy,
    /// strftime pattern for the acquisition date.
    pub date_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            regions: default_region_ids(),
            levels: default_levels()
                .into_iter()
                .map(|(label, color)| LevelConfig {
                    label: label.to_string(),
                    color: color.to_hex(),
                })
                .collect(),
            draw_policy: DrawPolicy::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ReportConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the catalog, palette and date format are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        self.catalog()?;
        self.palette()?;
        check_date_format(&self.date_format)
            .map_err(|_| ConfigError::DateFormat(self.date_format.clone()))
    }

    pub fn catalog(&self) -> ConfigResult<RegionCatalog> {
        Ok(RegionCatalog::new(self.regions.iter().cloned())?)
    }

    pub fn palette(&self) -> ConfigResult<Palette> {
        let entries = self
            .levels
            .iter()
            .map(|level| -> PaletteResult<(String, Rgb)> {
                Ok((level.label.clone(), Rgb::from_hex(&level.color)?))
            })
            .collect::<PaletteResult<Vec<_>>>()?;
        Ok(Palette::new(entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_built_in_tables() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog().unwrap(), RegionCatalog::lung_areas());
        assert_eq!(config.palette().unwrap(), Palette::default());
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ReportConfig::from_json(r#"{"title": "Ward 3"}"#).unwrap();
        assert_eq!(config.title, "Ward 3");
        assert_eq!(config.regions.len(), 14);
        assert_eq!(config.draw_policy, DrawPolicy::IncludeNotMeasured);
    }

    #[test]
    fn test_draw_policy_from_json() {
        let config = ReportConfig::from_json(r#"{"draw_policy": "scored_only"}"#).unwrap();
        assert_eq!(config.draw_policy, DrawPolicy::ScoredOnly);
    }

    #[test]
    fn test_empty_levels_rejected() {
        let result = ReportConfig::from_json(r#"{"levels": []}"#);
        assert!(matches!(result, Err(ConfigError::Palette(PaletteError::Empty))));
    }

    #[test]
    fn test_bad_color_rejected() {
        let result =
            ReportConfig::from_json(r#"{"levels": [{"label": "x", "color": "red"}]}"#);
        assert!(matches!(
            result,
            Err(ConfigError::Palette(PaletteError::InvalidColor(_)))
        ));
    }

    #[test]
    fn test_duplicate_region_rejected() {
        let result = ReportConfig::from_json(r#"{"regions": ["a", "a"]}"#);
        assert!(matches!(result, Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let result = ReportConfig::from_json(r#"{"date_format": "%Q"}"#);
        assert!(matches!(result, Err(ConfigError::DateFormat(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ReportConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(ReportConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, r#"{"regions": ["left", "right"]}"#).unwrap();

        let config = ReportConfig::from_path(&path).unwrap();
        assert_eq!(config.catalog().unwrap().len(), 2);

        assert!(matches!(
            ReportConfig::from_path(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
