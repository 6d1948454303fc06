//! Detection hit types and suppression.
//!
//! Template matching over a ticket region produces clouds of overlapping
//! candidates; these helpers thin them to one hit per printed glyph.

use serde::Serialize;

/// A classified digit glyph. `y` is the vertical center of the glyph's
/// bounding box, which is what row grouping clusters on; `x` is the box's
/// left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DigitHit {
    pub x: i32,
    pub y: i32,
    pub digit: u8,
    pub score: f64,
}

/// A matched "PB" marker. `x`/`y` are the template's top-left placement;
/// `width`/`height` are the template dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerHit {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub score: f64,
}

impl MarkerHit {
    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    /// x just past the marker's right edge; digits beyond it belong to the
    /// powerball column.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }
}

/// Non-maximum suppression for marker candidates: walk candidates by
/// descending score and keep one iff no already-kept marker lies within
/// `radius` pixels in both x and y. Kept markers are returned sorted by y.
pub fn suppress_markers(mut candidates: Vec<MarkerHit>, radius: i32) -> Vec<MarkerHit> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<MarkerHit> = Vec::new();
    for candidate in candidates {
        let duplicate = kept
            .iter()
            .any(|k| (k.x - candidate.x).abs() < radius && (k.y - candidate.y).abs() < radius);
        if !duplicate {
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|marker| marker.y);
    kept
}

/// Contour detection occasionally emits two boxes for the same glyph; keep
/// only the higher-scoring classification within `radius` pixels of a kept
/// hit.
pub fn dedupe_digits(mut hits: Vec<DigitHit>, radius: i32) -> Vec<DigitHit> {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<DigitHit> = Vec::new();
    for hit in hits {
        let duplicate = kept.iter().any(|k| {
            let dx = (k.x - hit.x) as f64;
            let dy = (k.y - hit.y) as f64;
            (dx * dx + dy * dy).sqrt() <= radius as f64
        });
        if !duplicate {
            kept.push(hit);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(x: i32, y: i32, score: f64) -> MarkerHit {
        MarkerHit {
            x,
            y,
            width: 80,
            height: 64,
            score,
        }
    }

    #[test]
    fn test_marker_suppression_keeps_best_per_cluster() {
        let candidates = vec![
            marker(100, 200, 0.80),
            marker(110, 210, 0.95),
            marker(105, 195, 0.78),
            marker(100, 90, 0.85),
        ];
        let kept = suppress_markers(candidates, 30);
        assert_eq!(kept.len(), 2);
        // Sorted by y, cluster survivor is the 0.95 candidate.
        assert_eq!(kept[0].y, 90);
        assert_eq!(kept[1].score, 0.95);
    }

    #[test]
    fn test_marker_offset_on_one_axis_not_suppressed() {
        let kept = suppress_markers(vec![marker(100, 200, 0.9), marker(100, 260, 0.8)], 30);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_digit_dedupe_prefers_higher_score() {
        let hits = vec![
            DigitHit {
                x: 50,
                y: 80,
                digit: 3,
                score: 0.6,
            },
            DigitHit {
                x: 54,
                y: 83,
                digit: 8,
                score: 0.9,
            },
            DigitHit {
                x: 200,
                y: 80,
                digit: 1,
                score: 0.5,
            },
        ];
        let kept = dedupe_digits(hits, 10);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().any(|h| h.digit == 8));
        assert!(kept.iter().all(|h| h.digit != 3));
    }
}
