//! Plays-region isolation on the normalized canvas.
//!
//! The numeric plays sit in a band between the dashed separator under the
//! ticket header and the QR code. The separator is found by horizontal
//! projection: a dashed line covers a moderate fraction of the width, where
//! solid rules and barcodes project at or near the maximum.

use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat, Rect},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Fraction of the band height where the separator search starts and
    /// ends.
    pub search_start: f64,
    pub search_end: f64,
    /// A row qualifies as the dashed separator when its projection falls in
    /// this fraction band of the observed maximum.
    pub separator_low: f64,
    pub separator_high: f64,
    /// Separator position as a fraction of the band height when projection
    /// finds nothing.
    pub fallback_separator: f64,
    /// Margins absorbing small localization error.
    pub separator_margin: i32,
    pub qr_margin: i32,
    /// Regions shorter than this cannot hold a play row.
    pub min_height: i32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            search_start: 0.58,
            search_end: 0.72,
            separator_low: 0.3,
            separator_high: 0.7,
            fallback_separator: 0.65,
            separator_margin: 10,
            qr_margin: 10,
            min_height: 100,
        }
    }
}

/// Locate the plays band on a normalized canvas. `qr_top` is the first QR
/// row, known from the canvas layout. Returns `None` when the band is too
/// short to hold plays.
pub fn locate_plays_region(
    normalized: &Mat,
    qr_top: i32,
    config: &RegionConfig,
) -> Result<Option<Rect>> {
    let band_height = qr_top.min(normalized.rows());
    let width = normalized.cols();
    if band_height <= 0 || width <= 0 {
        return Ok(None);
    }

    let separator_y = match find_separator(normalized, band_height, config)? {
        Some(y) => y,
        None => {
            debug!("no dashed separator; using proportional offset");
            (config.fallback_separator * band_height as f64) as i32
        }
    };

    let top = separator_y + config.separator_margin;
    let bottom = qr_top - config.qr_margin;
    if bottom - top < config.min_height {
        debug!(top, bottom, "plays region too short");
        return Ok(None);
    }

    Ok(Some(Rect::new(0, top, width, bottom - top)))
}

/// Scan the configured fraction of the band for the first row whose
/// foreground projection is dashed-line-like.
fn find_separator(normalized: &Mat, band_height: i32, config: &RegionConfig) -> Result<Option<i32>> {
    let start = (config.search_start * band_height as f64) as i32;
    let end = ((config.search_end * band_height as f64) as i32).min(band_height);
    if start >= end {
        return Ok(None);
    }

    let mut projections = Vec::with_capacity((end - start) as usize);
    for y in start..end {
        let row = normalized.row(y).context("row view failed")?;
        projections.push(core::count_non_zero(&*row).context("row projection failed")?);
    }

    let max = *projections.iter().max().unwrap_or(&0);
    if max == 0 {
        return Ok(None);
    }

    let low = config.separator_low * max as f64;
    let high = config.separator_high * max as f64;
    for (i, &count) in projections.iter().enumerate() {
        let count = count as f64;
        if count >= low && count <= high {
            let y = start + i as i32;
            debug!(y, count, "dashed separator found");
            return Ok(Some(y));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::imgproc;

    fn blank(rows: i32, cols: i32) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, core::CV_8UC1, core::Scalar::all(0.0)).unwrap()
    }

    fn fill_row(image: &mut Mat, y: i32, x: i32, width: i32, height: i32) {
        imgproc::rectangle(
            image,
            Rect::new(x, y, width, height),
            core::Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
    }

    #[test]
    fn test_dashed_separator_found() -> Result<()> {
        let mut canvas = blank(1100, 400);
        // Solid rule sets the projection maximum, dashes cover half of it.
        fill_row(&mut canvas, 700, 0, 400, 2);
        for dash_x in (0..400).step_by(40) {
            fill_row(&mut canvas, 640, dash_x, 20, 2);
        }

        let region = locate_plays_region(&canvas, 1000, &RegionConfig::default())?.unwrap();
        assert_eq!(region, Rect::new(0, 650, 400, 340));
        Ok(())
    }

    #[test]
    fn test_empty_band_uses_proportional_fallback() -> Result<()> {
        let canvas = blank(1100, 400);
        let region = locate_plays_region(&canvas, 1000, &RegionConfig::default())?.unwrap();
        assert_eq!(region, Rect::new(0, 660, 400, 330));
        Ok(())
    }

    #[test]
    fn test_short_band_rejected() -> Result<()> {
        let canvas = blank(200, 400);
        assert!(locate_plays_region(&canvas, 120, &RegionConfig::default())?.is_none());
        Ok(())
    }
}
