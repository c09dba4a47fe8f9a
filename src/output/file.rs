use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::Path;

/// Encode `image` as PNG at `path`, creating parent directories as needed.
///
/// RGBA images keep their alpha channel.
pub fn save_png(path: &Path, image: &DynamicImage) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        "Wrote {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
