//! Image resizing algorithms and utilities

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use crate::error::{Result, ScalerError};
use tracing::debug;

/// Resizer that always produces exactly the requested dimensions.
///
/// Aspect ratio is never preserved: a 300x100 source scaled to 64x64 is
/// stretched, not letterboxed or cropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer {
    filter: FilterType,
}

/// Available resize filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for image::imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Triangle => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Gaussian => image::imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl ImageResizer {
    /// Create a resizer using Lanczos3
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resizer with custom filter
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// Resize to exactly `width` x `height`
    pub fn resize_exact(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage> {
        if width == 0 || height == 0 {
            return Err(ScalerError::invalid_parameters(
                "Width and height must be greater than 0"
            ));
        }

        debug!(
            "Resizing {}x{} -> {}x{} using {:?}",
            image.width(),
            image.height(),
            width,
            height,
            self.filter
        );

        if width == image.width() && height == image.height() {
            return Ok(image.clone());
        }

        Ok(image.resize_exact(width, height, self.filter.into()))
    }
}
