//! Pipeline driver and path dispatcher.

use super::config::ExtractionConfig;
use super::{digits, rows};
use crate::hits::{DigitHit, MarkerHit};
use crate::template::{TemplateMatcher, TemplateSet};
use crate::utils::ImageUtils;
use crate::{binarize, normalize, region, Result};
use anyhow::Context;
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use playscan_core::{textual, PlayList};
use serde::Serialize;
use std::path::Path;
use std::sync::Once;
use std::time::Instant;
use tracing::{debug, info, warn};

static TEMPLATE_WARNING: Once = Once::new();

/// Which path produced the plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionMethod {
    TemplateMatching,
    Textual,
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    pub markers_found: usize,
    pub digit_candidates: usize,
    pub digits_matched: usize,
    pub rows_grouped: usize,
    pub plays_emitted: usize,
    pub processing_time_ms: u64,
}

/// Result of one extraction call. An empty play list means nothing could be
/// recovered; it is not an error.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub plays: PlayList,
    pub method: ExtractionMethod,
    pub stats: ExtractionStats,
}

impl Extraction {
    fn empty(method: ExtractionMethod, started: Instant) -> Self {
        Self {
            plays: PlayList::new(),
            method,
            stats: ExtractionStats {
                processing_time_ms: started.elapsed().as_millis() as u64,
                ..ExtractionStats::default()
            },
        }
    }

    /// Export the extraction in JSON format.
    pub fn export_json<P: AsRef<Path>>(&self, output_path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("failed to serialize extraction")?;
        std::fs::write(&output_path, json)
            .with_context(|| format!("failed to write JSON to: {:?}", output_path.as_ref()))?;
        Ok(())
    }
}

/// Ticket play extractor. Owns the immutable template library; each call is
/// a pure function of the frame (and, for the dispatcher, the supplied
/// transcript).
pub struct PlayExtractor {
    templates: TemplateSet,
    matcher: TemplateMatcher,
    config: ExtractionConfig,
}

impl PlayExtractor {
    pub fn new(templates: TemplateSet, config: ExtractionConfig) -> Self {
        let matcher = TemplateMatcher::new(config.match_config.clone());
        Self {
            templates,
            matcher,
            config,
        }
    }

    /// Primary path: binarize, normalize on the QR anchor, isolate the
    /// plays region, and read it with template matching. Soft failures
    /// (no anchor, no digits, nothing validated) yield an empty result.
    pub fn extract(&self, frame: &Mat) -> Result<Extraction> {
        let started = Instant::now();

        if !self.templates.is_complete() {
            TEMPLATE_WARNING.call_once(|| {
                warn!(
                    missing = ?self.templates.missing(),
                    "template library incomplete; template matching disabled"
                );
            });
            return Ok(Extraction::empty(ExtractionMethod::TemplateMatching, started));
        }

        let binary = binarize::binarize(frame)?;
        self.dump_stage("01_binary", &binary)?;

        let normalized = normalize::normalize(&binary, &self.config.normalize)?;
        let Some(layout) = normalized.canvas else {
            return Ok(Extraction::empty(ExtractionMethod::TemplateMatching, started));
        };
        self.dump_stage("02_normalized", &normalized.image)?;

        let Some(region_rect) =
            region::locate_plays_region(&normalized.image, layout.qr_top(), &self.config.region)?
        else {
            info!("plays region not found");
            return Ok(Extraction::empty(ExtractionMethod::TemplateMatching, started));
        };
        let plays_region = Mat::roi(&normalized.image, region_rect)?.try_clone()?;

        let (plays, mut stats) = self.extract_from_region(&plays_region)?;
        stats.processing_time_ms = started.elapsed().as_millis() as u64;

        Ok(Extraction {
            plays,
            method: ExtractionMethod::TemplateMatching,
            stats,
        })
    }

    /// Template-matching core over an already-isolated plays region.
    pub fn extract_from_region(&self, plays_region: &Mat) -> Result<(PlayList, ExtractionStats)> {
        let mut stats = ExtractionStats::default();

        let cleaned = ImageUtils::close_gaps(plays_region, self.config.closing_iterations)?;
        self.dump_stage("03_plays_region", &cleaned)?;

        let markers = self.matcher.find_markers(&cleaned, &self.templates)?;
        stats.markers_found = markers.len();
        debug!(markers = markers.len(), "PB markers detected");

        let boxes = digits::find_digit_candidates(&cleaned, &self.config.contour_filter)?;
        stats.digit_candidates = boxes.len();

        let hits = digits::classify_candidates(
            &cleaned,
            &boxes,
            &self.matcher,
            &self.templates,
            self.config.dedupe_radius,
        )?;
        stats.digits_matched = hits.len();

        if self.config.debug_dir.is_some() {
            self.visualize(&cleaned, &markers, &hits)?;
        }

        if hits.is_empty() {
            info!("no digits passed the confidence floor");
            return Ok((PlayList::new(), stats));
        }

        let grouped = rows::group_rows(hits, self.config.row_gap);
        stats.rows_grouped = grouped.len();

        let mut plays = PlayList::new();
        for mut row in grouped {
            if let Some(play) = rows::reconstruct_row(&mut row, &markers, &self.config) {
                plays.push(play);
            }
        }
        stats.plays_emitted = plays.len();
        info!(plays = plays.len(), "template matching finished");

        Ok((plays, stats))
    }

    /// Dispatcher: run the primary path, and only when it produces zero
    /// plays hand the supplied recognized-text transcript to the textual
    /// extractor. The two paths share nothing but the validator.
    pub fn extract_with_fallback(
        &self,
        frame: &Mat,
        recognized_text: Option<&str>,
    ) -> Result<Extraction> {
        let primary = self.extract(frame)?;
        if !primary.plays.is_empty() {
            return Ok(primary);
        }

        let Some(text) = recognized_text else {
            return Ok(primary);
        };

        info!("primary path empty; running textual fallback");
        let started = Instant::now();
        let plays = textual::extract_plays(text);

        let mut extraction = Extraction::empty(ExtractionMethod::Textual, started);
        extraction.stats.plays_emitted = plays.len();
        extraction.plays = plays;
        Ok(extraction)
    }

    fn dump_stage(&self, name: &str, image: &Mat) -> Result<()> {
        let Some(dir) = &self.config.debug_dir else {
            return Ok(());
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create debug dir: {dir:?}"))?;
        ImageUtils::save_image(image, dir.join(format!("{name}.png")))
    }

    /// Draw marker boxes and digit classifications over the cleaned region.
    fn visualize(&self, cleaned: &Mat, markers: &[MarkerHit], hits: &[DigitHit]) -> Result<()> {
        let mut output = Mat::default();
        imgproc::cvt_color(cleaned, &mut output, imgproc::COLOR_GRAY2BGR, 0)
            .context("visualization conversion failed")?;

        for marker in markers {
            imgproc::rectangle(
                &mut output,
                Rect::new(marker.x, marker.y, marker.width, marker.height),
                Scalar::new(0.0, 255.0, 255.0, 255.0),
                2,
                LINE_8,
                0,
            )?;
        }

        for hit in hits {
            imgproc::put_text(
                &mut output,
                &hit.digit.to_string(),
                Point::new(hit.x, hit.y),
                FONT_HERSHEY_SIMPLEX,
                0.7,
                Scalar::new(0.0, 255.0, 0.0, 255.0),
                2,
                LINE_8,
                false,
            )?;
        }

        self.dump_stage("04_matches", &output)
    }
}

/// Convenience entry point: extract plays from one frame with the default
/// configuration.
pub fn extract_plays(frame: &Mat, templates: &TemplateSet) -> Result<PlayList> {
    let extractor = PlayExtractor::new(templates.clone(), ExtractionConfig::default());
    Ok(extractor.extract(frame)?.plays)
}
