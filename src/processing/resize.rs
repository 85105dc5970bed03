//! Image resizing policies

use image::{imageops, DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ResizeMode;

/// Resampling filter applied by [`ImageResizer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
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
    /// Lanczos with radius 3
    #[default]
    Lanczos3,
}

impl From<FilterType> for imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => imageops::FilterType::Nearest,
            FilterType::Triangle => imageops::FilterType::Triangle,
            FilterType::CatmullRom => imageops::FilterType::CatmullRom,
            FilterType::Gaussian => imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

/// Applies a [`ResizeMode`] to a decoded image
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer {
    filter: FilterType,
}

impl ImageResizer {
    /// Create a resizer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resizer with custom filter
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Resize `image` into the `width`×`height` box using `mode`
    pub fn resize(
        &self,
        image: &DynamicImage,
        mode: ResizeMode,
        width: u32,
        height: u32,
    ) -> DynamicImage {
        debug!(
            "Resizing {}x{} -> {}x{} ({}, {:?})",
            image.width(),
            image.height(),
            width,
            height,
            mode,
            self.filter
        );

        match mode {
            ResizeMode::Fit => self.fit(image, width, height),
            ResizeMode::Contain => self.contain(image, width, height),
            ResizeMode::Cover => self.cover(image, width, height),
            ResizeMode::Fill => self.scale(image, width, height),
        }
    }

    fn scale(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        image.resize_exact(width, height, self.filter.into())
    }

    fn fit(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (w, h) = fit_dimensions(image.dimensions(), (width, height));
        self.scale(image, w, h)
    }

    /// Fit, then center on a transparent canvas of the exact box size
    fn contain(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let fitted = self.fit(image, width, height);
        if fitted.dimensions() == (width, height) {
            return fitted;
        }

        let mut canvas = DynamicImage::new_rgba8(width, height);
        let x = (width - fitted.width()) / 2;
        let y = (height - fitted.height()) / 2;
        imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));
        canvas
    }

    /// Crop the source around its center to the box aspect ratio, then scale
    fn cover(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (x, y, crop_width, crop_height) = cover_crop(image.dimensions(), (width, height));
        let cropped = image.crop_imm(x, y, crop_width, crop_height);
        self.scale(&cropped, width, height)
    }
}

/// Largest size with the source aspect ratio that fits inside `target`.
///
/// Matches the target exactly on at least one axis.
pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let original_aspect = f64::from(src_w) / f64::from(src_h);
    let target_aspect = f64::from(tgt_w) / f64::from(tgt_h);

    if original_aspect > target_aspect {
        let new_height = (f64::from(tgt_w) / original_aspect).round() as u32;
        (tgt_w, new_height.clamp(1, tgt_h))
    } else {
        let new_width = (f64::from(tgt_h) * original_aspect).round() as u32;
        (new_width.clamp(1, tgt_w), tgt_h)
    }
}

/// Centered region of `source` with the aspect ratio of `target`, as `(x, y, width, height)`.
///
/// The region spans the full source on at least one axis, so scaling it never
/// needs a buffer larger than the source or the target.
pub fn cover_crop(source: (u32, u32), target: (u32, u32)) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let original_aspect = f64::from(src_w) / f64::from(src_h);
    let target_aspect = f64::from(tgt_w) / f64::from(tgt_h);

    let (crop_w, crop_h) = if original_aspect > target_aspect {
        let crop_w = (f64::from(src_h) * target_aspect).round() as u32;
        (crop_w.clamp(1, src_w), src_h)
    } else {
        let crop_h = (f64::from(src_w) / target_aspect).round() as u32;
        (src_w, crop_h.clamp(1, src_h))
    };

    ((src_w - crop_w) / 2, (src_h - crop_h) / 2, crop_w, crop_h)
}
