//! Aspect-preserving resize applied to everything shown or persisted.

use image::{imageops, ImageBuffer, Pixel};

/// Target (width, height) whose longer side equals `max_dimension`.
///
/// Landscape images (`height < width`) get width `max_dimension` and height
/// `floor(height * max_dimension / width)`; everything else gets height
/// `max_dimension` and width `floor(width * max_dimension / height)`. Smaller
/// inputs are enlarged. A side that would floor to zero is kept at one pixel.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scaled = |side: u32, longest: u32| -> u32 {
        if longest == 0 {
            return max_dimension;
        }
        let value = u64::from(side) * u64::from(max_dimension) / u64::from(longest);
        // image cannot encode a zero-width side
        u32::try_from(value).unwrap_or(u32::MAX).max(1)
    };

    if height < width {
        (max_dimension, scaled(height, width))
    } else {
        (scaled(width, height), max_dimension)
    }
}

/// Resize `image` so its longer side is exactly `max_dimension`.
pub fn resize_preserving_ratio<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    max_dimension: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (width, height) = image.dimensions();
    let (new_width, new_height) = target_dimensions(width, height, max_dimension);

    if (new_width, new_height) == (width, height) {
        return image.clone();
    }

    tracing::debug!(
        "Resizing {}x{} -> {}x{}",
        width,
        height,
        new_width,
        new_height
    );
    imageops::resize(image, new_width, new_height, imageops::FilterType::Triangle)
}
