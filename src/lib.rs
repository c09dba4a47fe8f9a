//! Person background removal and replacement.
//!
//! A segmentation model turns a photo into a per-pixel foreground
//! probability grid. The grid is hard-thresholded into a decision grid, which
//! then drives a pixel-wise selection: a solid-color mask preview, an RGBA
//! cutout with a transparent background, or the subject composited onto a
//! replacement background.

pub mod composite;
pub mod config;
pub mod error;
pub mod input;
pub mod mask;
pub mod output;
pub mod pipeline;
pub mod resize;
pub mod segmentation;

pub use config::{
    BackgroundFit, MaskColors, ModelConfig, PersistResolution, PipelineConfig, TensorLayout,
};
pub use error::{Error, Result};
pub use mask::{threshold, DecisionGrid};
pub use pipeline::{OutputMode, Pipeline, PipelineReport};
pub use segmentation::{ProbabilityGrid, SegmentationModel};
