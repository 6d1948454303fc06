//! Frame binarization.

use crate::Result;
use anyhow::Context;
use opencv::{core::Mat, imgproc, prelude::*};

/// Collapse a captured frame to a clean two-level image.
///
/// Multi-channel input is converted to grayscale first, then thresholded
/// with Otsu's method in the inverted sense: ink comes out as 255 on a 0
/// background, so correlation, contour finding, and projections all treat
/// print as positive signal. No per-image tuning.
pub fn binarize(frame: &Mat) -> Result<Mat> {
    let gray = if frame.channels() > 1 {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
            .context("grayscale conversion failed")?;
        gray
    } else {
        frame.clone()
    };

    let mut binary = Mat::default();
    imgproc::threshold(
        &gray,
        &mut binary,
        0.0,
        255.0,
        imgproc::THRESH_BINARY_INV + imgproc::THRESH_OTSU,
    )
    .context("Otsu threshold failed")?;

    Ok(binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageUtils;
    use image::GrayImage;

    #[test]
    fn test_ink_becomes_foreground() -> Result<()> {
        // Dark "print" on a light background.
        let gray = GrayImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                image::Luma([40u8])
            } else {
                image::Luma([210u8])
            }
        });
        let frame = ImageUtils::gray_to_mat(&gray)?;

        let binary = binarize(&frame)?;
        assert_eq!(*binary.at_2d::<u8>(10, 10)?, 255);
        assert_eq!(*binary.at_2d::<u8>(10, 50)?, 0);

        let back = ImageUtils::mat_to_gray(&binary)?;
        assert!(back.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        Ok(())
    }
}
