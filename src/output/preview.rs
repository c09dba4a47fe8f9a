use super::PreviewSink;
use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat};
use std::io::{self, BufRead, Write};
use tempfile::TempDir;

/// Shows images in the system image viewer
///
/// Each image is written as a PNG into a private temporary directory and
/// opened with the desktop's default handler. `show` then blocks until Enter
/// is pressed on stdin. The directory is removed when the sink is dropped.
pub struct ViewerPreview {
    dir: TempDir,
    shown: usize,
}

impl ViewerPreview {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("bgswap-preview-")
            .tempdir()
            .map_err(Error::Preview)?;

        tracing::debug!("Preview directory: {}", dir.path().display());

        Ok(Self { dir, shown: 0 })
    }
}

impl PreviewSink for ViewerPreview {
    fn show(&mut self, title: &str, image: &DynamicImage) -> Result<()> {
        self.shown += 1;
        let path = self.dir.path().join(format!("{:02}-{}.png", self.shown, title));

        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| Error::Encode {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Showing {} ({}x{})", title, image.width(), image.height());
        open::that(&path).map_err(Error::Preview)?;

        eprint!("Press Enter to continue...");
        io::stderr().flush().map_err(Error::Preview)?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(Error::Preview)?;

        Ok(())
    }
}

/// Headless preview: logs what would have been shown
#[derive(Debug, Default)]
pub struct NoPreview;

impl PreviewSink for NoPreview {
    fn show(&mut self, title: &str, image: &DynamicImage) -> Result<()> {
        tracing::debug!(
            "Preview disabled, skipping {} ({}x{})",
            title,
            image.width(),
            image.height()
        );
        Ok(())
    }
}
