use super::ImageSource;
use crate::error::{Error, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// An image file on disk, decoded by the `image` crate
pub struct FileImage {
    path: PathBuf,
}

impl FileImage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ImageSource for FileImage {
    fn load(&self) -> Result<RgbImage> {
        if !self.path.is_file() {
            return Err(Error::InputNotFound {
                path: self.path.clone(),
            });
        }

        tracing::debug!("Decoding {}", self.path.display());

        let decoded = image::open(&self.path).map_err(|source| Error::Decode {
            path: self.path.clone(),
            source,
        })?;

        // Gray and alpha inputs are normalized to three-channel RGB here
        Ok(decoded.to_rgb8())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
