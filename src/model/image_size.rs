//! Pixel dimensions of an annotated image.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Width and height of an image in pixels.
///
/// Label files store normalized coordinates only, so the size has to be
/// supplied again whenever labels are loaded or saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Read the dimensions from an image file header without decoding pixels.
    pub fn probe(path: &Path) -> Result<Self, image::ImageError> {
        let (width, height) = image::image_dimensions(path)?;
        log::debug!("Probed {:?}: {}x{}", path, width, height);
        Ok(Self { width, height })
    }

    /// Whether coordinates can be normalized against this size.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Image centre in pixel coordinates.
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Length of the shorter side.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height) as f32
    }
}
