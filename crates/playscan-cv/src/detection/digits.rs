//! Digit candidate detection and classification.

use super::config::ContourFilter;
use crate::hits::{self, DigitHit};
use crate::template::{TemplateMatcher, TemplateSet};
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{Mat, Point, Rect, Vector},
    imgproc,
    prelude::*,
};
use tracing::debug;

/// Find digit-sized bounding boxes via external contours on the cleaned
/// plays region.
pub fn find_digit_candidates(region: &Mat, filter: &ContourFilter) -> Result<Vec<Rect>> {
    let mut contours = Vector::<Vector<Point>>::new();
    imgproc::find_contours(
        region,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::default(),
    )
    .context("contour detection failed")?;

    let mut boxes = Vec::new();
    for contour in contours.iter() {
        let rect = imgproc::bounding_rect(&contour)?;
        let area = imgproc::contour_area(&contour, false)?;

        if rect.height >= filter.min_height
            && rect.width >= filter.min_width
            && rect.width <= filter.max_width
            && area >= filter.min_area
            && area <= filter.max_area
        {
            boxes.push(rect);
        }
    }

    debug!(candidates = boxes.len(), "digit-sized contours found");
    Ok(boxes)
}

/// Classify every candidate box against the digit templates, then collapse
/// duplicate boxes over the same glyph.
pub fn classify_candidates(
    region: &Mat,
    boxes: &[Rect],
    matcher: &TemplateMatcher,
    templates: &TemplateSet,
    dedupe_radius: i32,
) -> Result<Vec<DigitHit>> {
    #[cfg(feature = "parallel")]
    let classified: Vec<Option<DigitHit>> = {
        use rayon::prelude::*;
        boxes
            .par_iter()
            .map(|rect| classify_box(region, rect, matcher, templates))
            .collect::<Result<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let classified: Vec<Option<DigitHit>> = boxes
        .iter()
        .map(|rect| classify_box(region, rect, matcher, templates))
        .collect::<Result<Vec<_>>>()?;

    let hits: Vec<DigitHit> = classified.into_iter().flatten().collect();
    Ok(hits::dedupe_digits(hits, dedupe_radius))
}

fn classify_box(
    region: &Mat,
    rect: &Rect,
    matcher: &TemplateMatcher,
    templates: &TemplateSet,
) -> Result<Option<DigitHit>> {
    let candidate = Mat::roi(region, *rect)?.try_clone()?;

    Ok(matcher
        .classify_digit(&candidate, templates)?
        .map(|(digit, score)| DigitHit {
            x: rect.x,
            y: rect.y + rect.height / 2,
            digit,
            score,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC1};

    #[test]
    fn test_contour_filter_bounds() -> Result<()> {
        let mut region =
            Mat::new_rows_cols_with_default(200, 600, CV_8UC1, Scalar::all(0.0))?;
        // Digit-sized blob, a speck, and an oversized smear.
        for (rect, _keep) in [
            (Rect::new(20, 40, 44, 64), true),
            (Rect::new(200, 40, 6, 6), false),
            (Rect::new(300, 20, 120, 150), false),
        ] {
            imgproc::rectangle(&mut region, rect, Scalar::all(255.0), -1, imgproc::LINE_8, 0)?;
        }

        let boxes = find_digit_candidates(&region, &ContourFilter::default())?;
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0], Rect::new(20, 40, 44, 64));
        Ok(())
    }

    #[test]
    fn test_solid_digit_box_area_cap() -> Result<()> {
        // A 44x64 solid block sits inside the area window; a 90x90 one does
        // not, even though its width passes.
        let mut region =
            Mat::new_rows_cols_with_default(200, 400, CV_8UC1, Scalar::all(0.0))?;
        imgproc::rectangle(
            &mut region,
            Rect::new(20, 40, 90, 90),
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )?;
        let boxes = find_digit_candidates(&region, &ContourFilter::default())?;
        assert!(boxes.is_empty());
        Ok(())
    }
}
