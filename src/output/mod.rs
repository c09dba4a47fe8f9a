mod file;
mod preview;

pub use file::save_png;
pub use preview::{NoPreview, ViewerPreview};

use crate::error::Result;
use image::DynamicImage;

/// Trait for on-screen destinations of intermediate results
pub trait PreviewSink {
    /// Show an image, returning once the user has dismissed it
    fn show(&mut self, title: &str, image: &DynamicImage) -> Result<()>;
}
