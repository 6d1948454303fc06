//! QR-anchored orientation normalization.
//!
//! The QR code printed near the ticket's bottom edge is the one reliable
//! geometric reference in a handheld capture. Warping its detected corners
//! onto a fixed canvas position removes perspective and rotation in a single
//! deterministic step; no multi-orientation sweeps are attempted.

use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat, Point2f, Size, Vector},
    imgproc,
    objdetect::QRCodeDetector,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Canvas geometry relative to the detected QR edge length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Canvas side as a multiple of the QR edge; encodes the empirical
    /// ticket-to-QR size ratio.
    pub canvas_to_qr_ratio: f64,
    /// Margin between the QR and the canvas edge, as a fraction of the QR
    /// edge.
    pub qr_margin_ratio: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            canvas_to_qr_ratio: 10.8,
            qr_margin_ratio: 0.2,
        }
    }
}

/// Detected QR geometry: corners in the symbol's own frame (TL, TR, BR, BL
/// as anchored by the finder patterns) plus the mean edge length.
///
/// The detector's corner order is kept as-is. Re-sorting corners by image
/// position would re-anchor the warp on a rotated capture and leave the
/// canvas sideways; the finder-pattern order is what makes normalization
/// rotation-invariant.
#[derive(Debug, Clone)]
pub struct QrAnchor {
    pub corners: [Point2f; 4],
    pub edge: f32,
}

impl QrAnchor {
    /// Build an anchor from the detector's four corner points.
    pub fn from_points(points: &[Point2f]) -> Option<Self> {
        let corners: [Point2f; 4] = points.try_into().ok()?;
        let edge = mean_edge(&corners);
        (edge > f32::EPSILON).then_some(Self { corners, edge })
    }
}

/// Fixed placement of the QR inside the normalized canvas.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CanvasLayout {
    /// Canvas width and height (the canvas is square).
    pub side: i32,
    /// Rounded QR edge length on the canvas.
    pub qr_edge: i32,
    /// Top-left x and y of the QR on the canvas.
    pub qr_origin: i32,
}

impl CanvasLayout {
    pub fn new(edge: f32, config: &NormalizeConfig) -> Self {
        let side = (config.canvas_to_qr_ratio * edge as f64).round() as i32;
        let qr_edge = edge.round() as i32;
        let margin = (config.qr_margin_ratio * edge as f64).round() as i32;
        Self {
            side,
            qr_edge,
            qr_origin: side - qr_edge - margin,
        }
    }

    /// First row of the QR on the canvas; everything above it is ticket
    /// body.
    pub fn qr_top(&self) -> i32 {
        self.qr_origin
    }
}

/// Outcome of normalization. Without an anchor the image is the untouched
/// input and the primary extraction path cannot proceed.
#[derive(Debug)]
pub struct NormalizedTicket {
    pub image: Mat,
    pub anchor: Option<QrAnchor>,
    pub canvas: Option<CanvasLayout>,
}

impl NormalizedTicket {
    pub fn method(&self) -> &'static str {
        if self.anchor.is_some() {
            "qr_homography"
        } else {
            "none"
        }
    }
}

/// Detect the ticket QR on an inverted copy of the binary image, where the
/// QR's dark modules read as positive.
pub fn detect_anchor(binary: &Mat) -> Result<Option<QrAnchor>> {
    let detector = QRCodeDetector::default().context("QR detector construction failed")?;

    let mut inverted = Mat::default();
    core::bitwise_not(binary, &mut inverted, &core::no_array())
        .context("binary inversion failed")?;

    let mut points = Vector::<Point2f>::new();
    let found = match detector.detect(&inverted, &mut points) {
        Ok(found) => found,
        Err(err) => {
            debug!(%err, "QR detection errored; treating as not found");
            false
        }
    };

    if !found || points.len() != 4 {
        return Ok(None);
    }
    Ok(QrAnchor::from_points(&points.to_vec()))
}

/// Warp the binary image so the QR lands upright at its fixed canvas
/// position. Border areas exposed by the warp are filled with background
/// (0 under the inverted convention).
pub fn normalize_with_anchor(
    binary: &Mat,
    anchor: &QrAnchor,
    config: &NormalizeConfig,
) -> Result<(Mat, CanvasLayout)> {
    let layout = CanvasLayout::new(anchor.edge, config);
    let origin = layout.qr_origin as f32;
    let far = (layout.qr_origin + layout.qr_edge) as f32;

    let src = Vector::from_iter(anchor.corners);
    let dst = Vector::from_iter([
        Point2f::new(origin, origin),
        Point2f::new(far, origin),
        Point2f::new(far, far),
        Point2f::new(origin, far),
    ]);

    let transform = imgproc::get_perspective_transform(&src, &dst, core::DECOMP_LU)
        .context("perspective transform estimation failed")?;

    let mut warped = Mat::default();
    imgproc::warp_perspective(
        binary,
        &mut warped,
        &transform,
        Size::new(layout.side, layout.side),
        imgproc::INTER_LINEAR,
        core::BORDER_CONSTANT,
        core::Scalar::all(0.0),
    )
    .context("perspective warp failed")?;

    Ok((warped, layout))
}

/// Full normalization step: detect the QR, then warp. When no QR is found
/// the input is returned untouched with `method() == "none"`.
pub fn normalize(binary: &Mat, config: &NormalizeConfig) -> Result<NormalizedTicket> {
    match detect_anchor(binary)? {
        Some(anchor) => {
            debug!(edge = anchor.edge, "QR anchor detected");
            let (image, layout) = normalize_with_anchor(binary, &anchor, config)?;
            Ok(NormalizedTicket {
                image,
                anchor: Some(anchor),
                canvas: Some(layout),
            })
        }
        None => {
            info!("no QR anchor found");
            Ok(NormalizedTicket {
                image: binary.clone(),
                anchor: None,
                canvas: None,
            })
        }
    }
}

/// Mean of the two horizontal and two vertical edges of the corner quad.
fn mean_edge(corners: &[Point2f; 4]) -> f32 {
    let dist = |a: Point2f, b: Point2f| ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
    (dist(corners[0], corners[1])
        + dist(corners[3], corners[2])
        + dist(corners[0], corners[3])
        + dist(corners[1], corners[2]))
        / 4.0
}
