//! Fitting a replacement image to the pixel size of an existing resource.
//!
//! Fitting is a center crop to the target aspect ratio followed by a resample
//! to the exact target dimensions. The [`ImageFitter`] trait keeps the patch
//! engine independent of how that is done; [`CenterCropFitter`] is the
//! default implementation.

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;

use crate::{Error, Result};

/// Produces an image of exact dimensions from a source image file.
pub trait ImageFitter {
    /// Returns `source` cropped to the `width:height` aspect ratio and
    /// resized to exactly `width` x `height`.
    fn fit(&self, source: &Path, width: u32, height: u32) -> Result<DynamicImage>;
}

/// Centered crop followed by a Lanczos3 resize.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterCropFitter;

impl ImageFitter for CenterCropFitter {
    fn fit(&self, source: &Path, width: u32, height: u32) -> Result<DynamicImage> {
        let img = image::open(source).map_err(|e| Error::Image {
            context: source.display().to_string(),
            source: e,
        })?;
        fit_image(&img, width, height)
    }
}

/// Fits an in-memory image to `width` x `height`.
pub fn fit_image(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::InvalidDimensions {
            width: img.width(),
            height: img.height(),
        });
    }
    let (x, y, w, h) = crop_region(img.width(), img.height(), width, height);
    log::debug!(
        "Fitting {}x{} image: crop {}x{} at ({}, {}), resize to {}x{}",
        img.width(),
        img.height(),
        w,
        h,
        x,
        y,
        width,
        height
    );
    Ok(img
        .crop_imm(x, y, w, h)
        .resize_exact(width, height, FilterType::Lanczos3))
}

/// Computes the centered crop `(x, y, width, height)` with the target aspect ratio.
///
/// A source wider than the target keeps its height; otherwise it keeps its
/// width. The cropped extent never drops below one pixel. Ratios are
/// compared in integer arithmetic so equal ratios never lose a row.
pub fn crop_region(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    let (sw, sh, dw, dh) = (src_w as u64, src_h as u64, dst_w as u64, dst_h as u64);

    if sw * dh > dw * sh {
        let new_w = ((sh * dw / dh) as u32).clamp(1, src_w);
        let offset = (src_w - new_w) / 2;
        (offset, 0, new_w, src_h)
    } else {
        let new_h = ((sw * dh / dw) as u32).clamp(1, src_h);
        let offset = (src_h - new_h) / 2;
        (0, offset, src_w, new_h)
    }
}
