//! Pixel-wise selection between two sources driven by a decision grid.
//!
//! Every mode is a hard `select(condition, a, b)`: no blending and no
//! smoothing at subject boundaries.

use image::{GrayImage, ImageBuffer, Luma, Pixel, RgbImage, Rgba, RgbaImage};

use crate::config::MaskColors;
use crate::error::{Error, Result};
use crate::mask::DecisionGrid;

const OPAQUE: u8 = 255;
const TRANSPARENT: u8 = 0;

/// Fail with `ShapeMismatch` unless both (width, height) pairs agree.
pub fn ensure_same_shape(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Take each pixel from `foreground` where the decision is true and from
/// `background` elsewhere.
pub fn select<P: Pixel>(
    decision: &DecisionGrid,
    foreground: &ImageBuffer<P, Vec<P::Subpixel>>,
    background: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    ensure_same_shape(decision.dimensions(), foreground.dimensions())?;
    ensure_same_shape(decision.dimensions(), background.dimensions())?;

    let (width, height) = decision.dimensions();
    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        if decision.is_foreground(x, y) {
            *foreground.get_pixel(x, y)
        } else {
            *background.get_pixel(x, y)
        }
    }))
}

/// Solid-color visualization of the decision grid.
pub fn mask_preview(decision: &DecisionGrid, colors: &MaskColors) -> Result<RgbImage> {
    let (width, height) = decision.dimensions();
    let fg_image = RgbImage::from_pixel(width, height, colors.foreground);
    let bg_image = RgbImage::from_pixel(width, height, colors.background);

    select(decision, &fg_image, &bg_image)
}

/// Append an alpha channel to `image`: opaque on the subject, transparent elsewhere.
///
/// The selection runs on single-channel layers so the appended channel keeps
/// the image's width and height and adds exactly one channel.
pub fn alpha_cutout(image: &RgbImage, decision: &DecisionGrid) -> Result<RgbaImage> {
    ensure_same_shape(image.dimensions(), decision.dimensions())?;

    let (width, height) = image.dimensions();
    let opaque_layer = GrayImage::from_pixel(width, height, Luma([OPAQUE]));
    let transparent_layer = GrayImage::from_pixel(width, height, Luma([TRANSPARENT]));
    let alpha = select(decision, &opaque_layer, &transparent_layer)?;

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Rgba([r, g, b, alpha.get_pixel(x, y)[0]])
    }))
}

/// Keep the subject from `image` and fill everything else from `background`.
///
/// `background` must already have the source dimensions.
pub fn replace_background(
    image: &RgbImage,
    background: &RgbImage,
    decision: &DecisionGrid,
) -> Result<RgbImage> {
    ensure_same_shape(image.dimensions(), background.dimensions())?;
    select(decision, image, background)
}
