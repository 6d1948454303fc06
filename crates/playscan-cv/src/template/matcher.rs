//! Template matching against the glyph library.

use super::{MatchConfig, TemplateSet};
use crate::hits::{self, MarkerHit};
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat, Size},
    imgproc,
    prelude::*,
};
use tracing::debug;

/// Normalized-correlation matcher for digit glyphs and the "PB" marker.
pub struct TemplateMatcher {
    config: MatchConfig,
}

impl TemplateMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Classify a candidate glyph region against the digit templates.
    ///
    /// For every digit the candidate is resized to each scaled template and
    /// correlated; the digit with the best score across scales wins.
    /// Returns `None` when the best score stays under the confidence floor.
    pub fn classify_digit(
        &self,
        candidate: &Mat,
        templates: &TemplateSet,
    ) -> Result<Option<(u8, f64)>> {
        let mut best: Option<(u8, f64)> = None;

        for digit in 0..10u8 {
            let Some(template) = templates.digit(digit) else {
                continue;
            };

            let mut digit_best = 0.0f64;
            for &scale in &self.config.scale_factors {
                let scaled = self.scale_template(template, scale)?;
                let size = scaled.size()?;
                if size.width < 1 || size.height < 1 {
                    continue;
                }

                let mut resized = Mat::default();
                imgproc::resize(candidate, &mut resized, size, 0.0, 0.0, imgproc::INTER_LINEAR)
                    .context("candidate resize failed")?;

                let score = correlate(&resized, &scaled)?;
                if score > digit_best {
                    digit_best = score;
                }
            }

            if best.map_or(true, |(_, score)| digit_best > score) {
                best = Some((digit, digit_best));
            }
        }

        Ok(best.filter(|&(_, score)| score >= self.config.digit_score_floor))
    }

    /// Sweep the plays region for "PB" markers: correlate everywhere, keep
    /// positions above the marker floor, and suppress near-duplicates.
    /// Markers come back sorted top to bottom.
    pub fn find_markers(&self, region: &Mat, templates: &TemplateSet) -> Result<Vec<MarkerHit>> {
        let Some(template) = templates.marker() else {
            return Ok(Vec::new());
        };

        let region_size = region.size()?;
        let template_size = template.size()?;
        if region_size.width < template_size.width || region_size.height < template_size.height {
            debug!("region smaller than marker template; skipping sweep");
            return Ok(Vec::new());
        }

        let mut result = Mat::default();
        imgproc::match_template(
            region,
            template,
            &mut result,
            imgproc::TM_CCOEFF_NORMED,
            &core::no_array(),
        )
        .context("marker template matching failed")?;

        let mut candidates = Vec::new();
        for y in 0..result.rows() {
            for x in 0..result.cols() {
                let score = *result.at_2d::<f32>(y, x)? as f64;
                if score >= self.config.marker_score_floor {
                    candidates.push(MarkerHit {
                        x,
                        y,
                        width: template_size.width,
                        height: template_size.height,
                        score,
                    });
                }
            }
        }

        Ok(hits::suppress_markers(
            candidates,
            self.config.marker_suppression_radius,
        ))
    }

    fn scale_template(&self, template: &Mat, scale: f64) -> Result<Mat> {
        if (scale - 1.0).abs() < f64::EPSILON {
            return Ok(template.try_clone()?);
        }

        let size = template.size()?;
        let scaled_size = Size::new(
            (size.width as f64 * scale) as i32,
            (size.height as f64 * scale) as i32,
        );

        let mut scaled = Mat::default();
        imgproc::resize(template, &mut scaled, scaled_size, 0.0, 0.0, imgproc::INTER_LINEAR)
            .context("template resize failed")?;
        Ok(scaled)
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

/// Normalized correlation of two same-sized single-channel images.
fn correlate(image: &Mat, template: &Mat) -> Result<f64> {
    let mut result = Mat::default();
    imgproc::match_template(
        image,
        template,
        &mut result,
        imgproc::TM_CCOEFF_NORMED,
        &core::no_array(),
    )
    .context("template correlation failed")?;
    Ok(*result.at_2d::<f32>(0, 0)? as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Scalar, CV_8UC1};

    fn glyph(rects: &[Rect]) -> Mat {
        let mut image =
            Mat::new_rows_cols_with_default(64, 44, CV_8UC1, Scalar::all(0.0)).unwrap();
        for rect in rects {
            imgproc::rectangle(&mut image, *rect, Scalar::all(255.0), -1, imgproc::LINE_8, 0)
                .unwrap();
        }
        image
    }

    fn two_glyph_set() -> TemplateSet {
        let mut set = TemplateSet::new();
        // A hollow box for 0 and a left bar for 1.
        set.insert_digit(
            0,
            glyph(&[
                Rect::new(0, 0, 44, 12),
                Rect::new(0, 52, 44, 12),
                Rect::new(0, 0, 12, 64),
                Rect::new(32, 0, 12, 64),
            ]),
        );
        set.insert_digit(1, glyph(&[Rect::new(16, 0, 12, 64)]));
        set
    }

    #[test]
    fn test_exact_match_scores_perfectly() -> Result<()> {
        let set = two_glyph_set();
        let matcher = TemplateMatcher::default();

        let candidate = set.digit(0).unwrap().try_clone()?;
        let (digit, score) = matcher.classify_digit(&candidate, &set)?.unwrap();
        assert_eq!(digit, 0);
        assert!(score > 0.99);
        Ok(())
    }

    #[test]
    fn test_low_correlation_rejected() -> Result<()> {
        let set = two_glyph_set();
        let matcher = TemplateMatcher::default();

        // Checkerboard resembles neither template.
        let mut noise = Mat::new_rows_cols_with_default(64, 44, CV_8UC1, Scalar::all(0.0))?;
        for y in (0..64).step_by(8) {
            for x in (0..44).step_by(8) {
                if (x / 8 + y / 8) % 2 == 0 {
                    imgproc::rectangle(
                        &mut noise,
                        Rect::new(x, y, 4, 4),
                        Scalar::all(255.0),
                        -1,
                        imgproc::LINE_8,
                        0,
                    )?;
                }
            }
        }
        assert!(matcher.classify_digit(&noise, &set)?.is_none());
        Ok(())
    }

    #[test]
    fn test_marker_sweep_finds_placement() -> Result<()> {
        let mut set = TemplateSet::new();
        let marker = glyph(&[
            Rect::new(0, 0, 12, 64),
            Rect::new(20, 0, 12, 64),
            Rect::new(0, 26, 44, 12),
        ]);
        set.set_marker(marker.try_clone()?);

        let mut region =
            Mat::new_rows_cols_with_default(200, 400, CV_8UC1, Scalar::all(0.0))?;
        let mut roi = Mat::roi_mut(&mut region, Rect::new(120, 60, 44, 64))?;
        marker.copy_to(&mut *roi)?;

        let markers = TemplateMatcher::default().find_markers(&region, &set)?;
        assert_eq!(markers.len(), 1);
        assert_eq!((markers[0].x, markers[0].y), (120, 60));
        assert!(markers[0].score > 0.99);
        Ok(())
    }

    #[test]
    fn test_region_smaller_than_marker_is_empty() -> Result<()> {
        let mut set = TemplateSet::new();
        set.set_marker(glyph(&[Rect::new(0, 0, 44, 64)]));
        let tiny = Mat::new_rows_cols_with_default(10, 10, CV_8UC1, Scalar::all(0.0))?;
        assert!(TemplateMatcher::default().find_markers(&tiny, &set)?.is_empty());
        Ok(())
    }
}
