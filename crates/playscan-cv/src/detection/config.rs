//! Extraction configuration

use crate::normalize::NormalizeConfig;
use crate::region::RegionConfig;
use crate::template::MatchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub match_config: MatchConfig,
    pub normalize: NormalizeConfig,
    pub region: RegionConfig,
    pub contour_filter: ContourFilter,
    /// Closing iterations joining broken digit strokes.
    pub closing_iterations: i32,
    /// Hits within this vertical distance of a row's first hit share the
    /// row.
    pub row_gap: i32,
    /// A marker is assignable to a row only when its vertical center lies
    /// within this distance of the row's mean y.
    pub marker_row_tolerance: i32,
    /// Adjacent digits closer than this in x pair into one two-digit
    /// number.
    pub pair_gap: i32,
    /// Overlapping digit boxes within this radius collapse to the best
    /// classification.
    pub dedupe_radius: i32,
    /// Rightmost digits kept before the marker (anything further left is
    /// the printed play label).
    pub max_white_digits: usize,
    /// Leftmost digits kept after the marker.
    pub max_powerball_digits: usize,
    /// When set, intermediate stage images and the match visualization are
    /// written here.
    pub debug_dir: Option<PathBuf>,
}

/// Bounding-box filter isolating printed digits from noise and from glued
/// double digits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourFilter {
    pub min_height: i32,
    pub min_width: i32,
    pub max_width: i32,
    pub min_area: f64,
    pub max_area: f64,
}

impl Default for ContourFilter {
    fn default() -> Self {
        Self {
            min_height: 30,
            min_width: 15,
            max_width: 90,
            min_area: 800.0,
            max_area: 6000.0,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            normalize: NormalizeConfig::default(),
            region: RegionConfig::default(),
            contour_filter: ContourFilter::default(),
            closing_iterations: 2,
            row_gap: 40,
            marker_row_tolerance: 40,
            pair_gap: 110,
            dedupe_radius: 10,
            max_white_digits: 10,
            max_powerball_digits: 2,
            debug_dir: None,
        }
    }
}
