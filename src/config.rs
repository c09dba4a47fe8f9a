use std::path::PathBuf;

use image::Rgb;

use crate::error::{Error, Result};

/// Default cutoff between background and foreground probabilities.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Default cap on the longer side of shown and persisted images.
pub const DEFAULT_MAX_DIMENSION: u32 = 480;

/// Solid colors used to visualize the decision grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskColors {
    pub foreground: Rgb<u8>,
    pub background: Rgb<u8>,
}

impl Default for MaskColors {
    fn default() -> Self {
        Self {
            foreground: Rgb([255, 255, 255]),
            background: Rgb([192, 192, 192]),
        }
    }
}

/// Resolution of the artifacts written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistResolution {
    /// Same bounded size as the preview.
    #[default]
    Resized,
    /// Native resolution of the source image.
    Source,
}

/// How a replacement background with a different shape is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundFit {
    /// Report `ShapeMismatch`.
    #[default]
    Strict,
    /// Stretch the background to the source dimensions.
    Stretch,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub threshold: f32,
    pub max_dimension: u32,
    pub mask_colors: MaskColors,
    pub output_dir: PathBuf,
    pub persist: PersistResolution,
    pub background_fit: BackgroundFit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_dimension: DEFAULT_MAX_DIMENSION,
            mask_colors: MaskColors::default(),
            output_dir: PathBuf::from("."),
            persist: PersistResolution::default(),
            background_fit: BackgroundFit::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject values no run could make sense of.
    ///
    /// Thresholds outside [0, 1] are accepted; they just classify every
    /// pixel the same way.
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(Error::InvalidConfig(
                "max dimension must be greater than zero".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Memory layout of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TensorLayout {
    /// `[1, height, width, 3]`, as exported from MediaPipe selfie segmentation.
    #[default]
    Nhwc,
    /// `[1, 3, height, width]`.
    Nchw,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
    pub layout: TensorLayout,
    pub intra_threads: usize,
}

impl ModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            input_width: 256,
            input_height: 256,
            layout: TensorLayout::default(),
            intra_threads: 4,
        }
    }
}

/// Parse an `R,G,B` triple such as `192,192,192`.
pub fn parse_rgb(value: &str) -> std::result::Result<Rgb<u8>, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected R,G,B but got '{value}'"));
    }

    let mut channels = [0u8; 3];
    for (channel, part) in channels.iter_mut().zip(&parts) {
        *channel = part
            .parse()
            .map_err(|_| format!("'{part}' is not a value between 0 and 255"))?;
    }

    Ok(Rgb(channels))
}
