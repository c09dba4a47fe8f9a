use image::RgbImage;

use crate::error::{Error, Result};

/// Per-pixel foreground probability, 0.0 = background, 1.0 = foreground.
/// Values are stored row-major and match the source image dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGrid {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl ProbabilityGrid {
    /// Wrap row-major values, checking they cover `width * height` pixels.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(Error::OracleOutput(format!(
                "{} probabilities for a {}x{} grid",
                values.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Everything is background.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y * self.width + x) as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Trait for segmentation models
/// Allows swapping between different backends (MediaPipe selfie, RVM, MODNet, ...)
pub trait SegmentationModel {
    /// Return the foreground probability of every pixel of `image`.
    ///
    /// The grid has the same width and height as `image`. A model that finds
    /// nothing may return an all-zero grid; that is a valid result.
    fn segment(&mut self, image: &RgbImage) -> Result<ProbabilityGrid>;
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for Box<M> {
    fn segment(&mut self, image: &RgbImage) -> Result<ProbabilityGrid> {
        (**self).segment(image)
    }
}
