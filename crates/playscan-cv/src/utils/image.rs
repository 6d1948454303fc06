//! Image I/O and conversion helpers.

use crate::Result;
use anyhow::Context;
use image::GrayImage;
use opencv::{
    core::{self, Mat, Point, Size},
    imgcodecs::{self, IMREAD_COLOR, IMREAD_GRAYSCALE},
    imgproc,
    prelude::*,
};
use std::path::Path;

/// Image utility functions shared across the pipeline.
pub struct ImageUtils;

impl ImageUtils {
    /// Load an image as a grayscale Mat.
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();
        let mat = imgcodecs::imread(&path_str, IMREAD_GRAYSCALE)
            .with_context(|| format!("failed to load grayscale image: {path_str}"))?;
        if mat.empty() {
            anyhow::bail!("image decode produced no data: {path_str}");
        }
        Ok(mat)
    }

    /// Load an image as a color Mat (BGR).
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();
        let mat = imgcodecs::imread(&path_str, IMREAD_COLOR)
            .with_context(|| format!("failed to load color image: {path_str}"))?;
        if mat.empty() {
            anyhow::bail!("image decode produced no data: {path_str}");
        }
        Ok(mat)
    }

    /// Save a Mat as an image.
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();
        imgcodecs::imwrite(&path_str, mat, &core::Vector::new())
            .with_context(|| format!("failed to save image: {path_str}"))?;
        Ok(())
    }

    /// Morphological closing with a 3x3 rectangular element; joins gaps in
    /// printed strokes without merging separate glyphs.
    pub fn close_gaps(image: &Mat, iterations: i32) -> Result<Mat> {
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(3, 3),
            Point::new(-1, -1),
        )
        .context("structuring element failed")?;

        let mut closed = Mat::default();
        imgproc::morphology_ex(
            image,
            &mut closed,
            imgproc::MORPH_CLOSE,
            &kernel,
            Point::new(-1, -1),
            iterations,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )
        .context("morphological closing failed")?;

        Ok(closed)
    }

    /// Convert an `image` crate grayscale buffer to a single-channel Mat.
    pub fn gray_to_mat(image: &GrayImage) -> Result<Mat> {
        let (width, height) = image.dimensions();
        let flat = Mat::from_slice(image.as_raw()).context("buffer wrap failed")?;
        let shaped = flat
            .reshape(1, height as i32)
            .context("buffer reshape failed")?;
        debug_assert_eq!(shaped.cols(), width as i32);
        Ok(shaped.try_clone()?)
    }

    /// Convert a single-channel Mat to an `image` crate grayscale buffer.
    pub fn mat_to_gray(mat: &Mat) -> Result<GrayImage> {
        anyhow::ensure!(mat.channels() == 1, "expected a single-channel Mat");

        let mut continuous = Mat::default();
        mat.copy_to(&mut continuous).context("Mat copy failed")?;

        let data = continuous.data_bytes().context("Mat data access failed")?;
        GrayImage::from_raw(mat.cols() as u32, mat.rows() as u32, data.to_vec())
            .context("Mat does not fit a grayscale buffer")
    }
}
