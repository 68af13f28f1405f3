//! Severity levels and the color palette that displays them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Palette errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaletteError {
    #[error("Palette must contain at least one level")]
    Empty,

    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

pub type PaletteResult<T> = Result<T, PaletteError>;

/// An opaque sRGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(s: &str) -> PaletteResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PaletteError::InvalidColor(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| PaletteError::InvalidColor(s.to_string()))?;
        Ok(Self::from_u32(value))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn to_unit(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = PaletteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// One diagnostic category.
///
/// `index` is the ordinal within its palette: 0 is baseline, the highest
/// index is "not measured", everything in between is increasing severity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeverityLevel {
    pub index: usize,
    pub label: String,
    pub color: Rgb,
}

impl SeverityLevel {
    pub fn is_baseline(&self) -> bool {
        self.index == 0
    }
}

/// Default level colors, baseline first and "not measured" last.
pub const WHITE: Rgb = Rgb::from_u32(0xFFFFFF);
pub const YELLOW: Rgb = Rgb::from_u32(0xFFE23B);
pub const BROWN: Rgb = Rgb::from_u32(0xB66726);
pub const RED: Rgb = Rgb::from_u32(0xBA170D);
pub const GRAY: Rgb = Rgb::from_u32(0x7D7C7C);

/// Ordered, non-empty table of severity levels.
///
/// The last level is always the "not measured" sentinel; the ones before it
/// are the scored levels that a tally counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    levels: Vec<SeverityLevel>,
}

impl Palette {
    /// Build a palette from `(label, color)` pairs in ordinal order.
    pub fn new<I, S>(entries: I) -> PaletteResult<Self>
    where
        I: IntoIterator<Item = (S, Rgb)>,
        S: Into<String>,
    {
        let levels: Vec<SeverityLevel> = entries
            .into_iter()
            .enumerate()
            .map(|(index, (label, color))| SeverityLevel {
                index,
                label: label.into(),
                color,
            })
            .collect();

        if levels.is_empty() {
            return Err(PaletteError::Empty);
        }

        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[SeverityLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false: construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&SeverityLevel> {
        self.levels.get(index)
    }

    pub fn not_measured_index(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn not_measured(&self) -> &SeverityLevel {
        &self.levels[self.not_measured_index()]
    }

    /// Levels counted by a tally, i.e. everything but "not measured".
    pub fn scored_levels(&self) -> &[SeverityLevel] {
        &self.levels[..self.not_measured_index()]
    }

    pub fn scored_len(&self) -> usize {
        self.not_measured_index()
    }

    pub fn is_not_measured(&self, level: &SeverityLevel) -> bool {
        level.index == self.not_measured_index()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            levels: default_levels()
                .into_iter()
                .enumerate()
                .map(|(index, (label, color))| SeverityLevel {
                    index,
                    label: label.to_string(),
                    color,
                })
                .collect(),
        }
    }
}

/// The lung ultrasound scale: scores 0-3 plus "not measured".
pub fn default_levels() -> Vec<(&'static str, Rgb)> {
    vec![
        ("Score 0", WHITE),
        ("Score 1", YELLOW),
        ("Score 2", BROWN),
        ("Score 3", RED),
        ("Not measured", GRAY),
    ]
}
