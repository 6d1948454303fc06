//! Template loading utilities

use super::TemplateSet;
use crate::binarize::binarize;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use opencv::core::Mat;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads the digit and marker templates from a directory.
///
/// Files are searched as `digit_0` .. `digit_9` and `marker_pb` with any of
/// the supported extensions. Every loaded image is re-binarized with the
/// runtime binarizer so the foreground convention always matches the
/// pipeline, whatever form the template files are stored in.
pub struct TemplateLoader {
    template_dir: PathBuf,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    pub fn new<P: AsRef<Path>>(template_dir: P) -> Self {
        Self {
            template_dir: template_dir.as_ref().to_path_buf(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add a supported extension.
    pub fn add_extension(mut self, ext: String) -> Self {
        self.supported_extensions.push(ext);
        self
    }

    /// Load whatever templates the directory holds. Missing files are
    /// warned about and left empty; an incomplete set only disables the
    /// template-matching path, not the textual fallback.
    pub fn load(&self) -> Result<TemplateSet> {
        let mut set = TemplateSet::new();

        for digit in 0..10u8 {
            match self.load_stem(&format!("digit_{digit}"))? {
                Some(image) => set.insert_digit(digit, image),
                None => warn!(digit, "digit template missing"),
            }
        }

        match self.load_stem("marker_pb")? {
            Some(image) => set.set_marker(image),
            None => warn!("PB marker template missing"),
        }

        Ok(set)
    }

    fn load_stem(&self, stem: &str) -> Result<Option<Mat>> {
        for ext in &self.supported_extensions {
            let path = self.template_dir.join(format!("{stem}.{ext}"));
            if !path.exists() {
                continue;
            }
            let gray = ImageUtils::load_grayscale(&path)
                .with_context(|| format!("failed to load template: {path:?}"))?;
            debug!(?path, "template loaded");
            return Ok(Some(binarize(&gray)?));
        }
        Ok(None)
    }
}
