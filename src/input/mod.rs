mod file_source;

pub use file_source::FileImage;

use crate::error::Result;
use image::RgbImage;

/// Trait for places a pixel grid can be read from
pub trait ImageSource {
    /// Decode the image as 8-bit RGB
    fn load(&self) -> Result<RgbImage>;

    /// Human-readable origin, used in log lines
    fn describe(&self) -> String;
}

/// An already decoded image.
impl ImageSource for RgbImage {
    fn load(&self) -> Result<RgbImage> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory {}x{} image", self.width(), self.height())
    }
}
