use image::{imageops, ImageBuffer, Luma, RgbImage};
use ndarray::{Array4, ArrayViewD};

use super::types::ProbabilityGrid;
use crate::config::TensorLayout;
use crate::error::{Error, Result};

/// Preprocessor for converting RGB images to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    layout: TensorLayout,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32, layout: TensorLayout) -> Self {
        Self {
            target_width,
            target_height,
            layout,
        }
    }

    /// Preprocess an RGB image into a normalized tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Convert to float and normalize to [0, 1]
    /// 3. Lay out as NHWC or NCHW
    ///
    /// Returns: Array4<f32> with shape [1, height, width, 3] or [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Triangle,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        let (h, w) = (height as usize, width as usize);
        let mut tensor = match self.layout {
            TensorLayout::Nhwc => Array4::<f32>::zeros((1, h, w, 3)),
            TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, h, w)),
        };

        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = pixel[c] as f32 / 255.0;
                match self.layout {
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                }
            }
        }

        tensor
    }

    /// Pull the single-channel matte out of a model output tensor.
    ///
    /// Accepts `[1, 1, H, W]`, `[1, H, W, 1]`, `[1, H, W]` and `[H, W]`.
    /// An empty tensor yields a 0x0 grid.
    pub fn extract_matte(output: ArrayViewD<'_, f32>) -> Result<ProbabilityGrid> {
        if output.is_empty() {
            return Ok(ProbabilityGrid::zeros(0, 0));
        }

        let (height, width) = match output.shape() {
            &[1, 1, h, w] | &[1, h, w, 1] | &[1, h, w] | &[h, w] => (h, w),
            shape => {
                return Err(Error::OracleOutput(format!(
                    "unsupported matte shape {shape:?}"
                )))
            }
        };

        // Every accepted shape only adds unit axes, so logical order is row-major.
        let values: Vec<f32> = output.iter().copied().collect();

        ProbabilityGrid::new(width as u32, height as u32, values)
    }

    /// Postprocess model output matte back to original image dimensions
    ///
    /// Resizes with bilinear filtering at full float precision and clamps
    /// the result to [0, 1].
    pub fn postprocess_matte(
        matte: &ProbabilityGrid,
        target_width: u32,
        target_height: u32,
    ) -> Result<ProbabilityGrid> {
        let _span = tracing::debug_span!("postprocess").entered();

        if matte.width() == 0 || matte.height() == 0 {
            tracing::debug!("Empty matte, treating every pixel as background");
            return Ok(ProbabilityGrid::zeros(target_width, target_height));
        }

        if matte.dimensions() == (target_width, target_height) {
            let clamped = matte.values().iter().map(|v| v.clamp(0.0, 1.0)).collect();
            return ProbabilityGrid::new(target_width, target_height, clamped);
        }

        let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_raw(matte.width(), matte.height(), matte.values().to_vec())
                .ok_or_else(|| Error::OracleOutput("matte buffer too small".to_string()))?;

        let resized = imageops::resize(
            &buffer,
            target_width,
            target_height,
            imageops::FilterType::Triangle,
        );

        let values = resized
            .into_raw()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0))
            .collect();

        ProbabilityGrid::new(target_width, target_height, values)
    }
}
