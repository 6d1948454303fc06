//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::TemplateLoader;
pub use matcher::TemplateMatcher;

use opencv::core::Mat;
use serde::{Deserialize, Serialize};

/// The glyph template library: one image per digit 0-9 plus the "PB"
/// marker. Loaded once at startup and shared read-only across extractions;
/// every image is single-channel and binarized with the runtime convention
/// (ink = 255).
#[derive(Debug, Default, Clone)]
pub struct TemplateSet {
    digits: [Option<Mat>; 10],
    marker: Option<Mat>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_digit(&mut self, digit: u8, image: Mat) {
        if let Some(slot) = self.digits.get_mut(digit as usize) {
            *slot = Some(image);
        }
    }

    pub fn set_marker(&mut self, image: Mat) {
        self.marker = Some(image);
    }

    pub fn digit(&self, digit: u8) -> Option<&Mat> {
        self.digits.get(digit as usize)?.as_ref()
    }

    pub fn marker(&self) -> Option<&Mat> {
        self.marker.as_ref()
    }

    /// The primary extraction path needs all ten digits and the marker.
    pub fn is_complete(&self) -> bool {
        self.marker.is_some() && self.digits.iter().all(Option::is_some)
    }

    /// Labels of the missing templates, for the one-time warning.
    pub fn missing(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .digits
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(digit, _)| digit.to_string())
            .collect();
        if self.marker.is_none() {
            missing.push("PB".to_string());
        }
        missing
    }
}

/// Correlation thresholds and the scale sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum normalized correlation to accept a digit classification.
    pub digit_score_floor: f64,
    /// Minimum normalized correlation to accept a "PB" marker position.
    pub marker_score_floor: f64,
    /// Marker candidates within this many pixels in both axes collapse to
    /// the best-scoring one.
    pub marker_suppression_radius: i32,
    /// Template scales swept per digit; tolerates the ticket-to-template
    /// size mismatch that remains after QR normalization.
    pub scale_factors: Vec<f64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            digit_score_floor: 0.40,
            marker_score_floor: 0.75,
            marker_suppression_radius: 30,
            scale_factors: vec![0.85, 0.925, 1.0, 1.075, 1.15],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{self, CV_8UC1};

    fn blank() -> Mat {
        Mat::new_rows_cols_with_default(64, 44, CV_8UC1, core::Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_completeness() {
        let mut set = TemplateSet::new();
        assert!(!set.is_complete());

        for digit in 0..10 {
            set.insert_digit(digit, blank());
        }
        assert!(!set.is_complete());
        assert_eq!(set.missing(), vec!["PB".to_string()]);

        set.set_marker(blank());
        assert!(set.is_complete());
        assert!(set.missing().is_empty());
    }
}
