//! Hard foreground/background decision from a probability grid.

use crate::segmentation::ProbabilityGrid;

/// Per-pixel foreground decision, row-major, same shape as the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionGrid {
    width: u32,
    height: u32,
    foreground: Vec<bool>,
}

impl DecisionGrid {
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut foreground = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                foreground.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            foreground,
        }
    }

    pub fn filled(width: u32, height: u32, foreground: bool) -> Self {
        Self {
            width,
            height,
            foreground: vec![foreground; width as usize * height as usize],
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

    /// Whether the pixel at (x, y) belongs to the subject.
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.foreground[(y * self.width + x) as usize]
    }

    pub fn foreground_count(&self) -> usize {
        self.foreground.iter().filter(|&&f| f).count()
    }
}

/// Classify every pixel whose probability is strictly greater than `cutoff`
/// as foreground. A probability equal to the cutoff is background.
pub fn threshold(probabilities: &ProbabilityGrid, cutoff: f32) -> DecisionGrid {
    let foreground = probabilities.values().iter().map(|&p| p > cutoff).collect();

    DecisionGrid {
        width: probabilities.width(),
        height: probabilities.height(),
        foreground,
    }
}
