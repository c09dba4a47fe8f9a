mod preprocess;
mod selfie;
pub mod types;

pub use preprocess::Preprocessor;
pub use selfie::SelfieSegmenter;
pub use types::{ProbabilityGrid, SegmentationModel};

use crate::config::ModelConfig;
use crate::error::Result;

/// Create the default segmentation model (MediaPipe selfie segmentation)
pub fn create_default_model(config: &ModelConfig) -> Result<Box<dyn SegmentationModel>> {
    let model = SelfieSegmenter::new(config)?;
    Ok(Box::new(model))
}
