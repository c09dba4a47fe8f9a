//! Single-image run: decode, segment, threshold, composite, persist.

use std::path::PathBuf;

use image::{imageops, DynamicImage, ImageBuffer, Pixel, RgbImage};

use crate::composite;
use crate::config::{BackgroundFit, PersistResolution, PipelineConfig};
use crate::error::Result;
use crate::input::ImageSource;
use crate::mask;
use crate::output::{save_png, PreviewSink};
use crate::resize::resize_preserving_ratio;
use crate::segmentation::SegmentationModel;

pub const ALPHA_OUTPUT: &str = "output_alpha.png";
pub const BACKGROUND_OUTPUT: &str = "output_background.png";

/// Which artifact a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// No background supplied: subject on a transparent background.
    AlphaCutout,
    /// Subject composited onto the supplied background.
    BackgroundReplacement,
}

impl OutputMode {
    pub fn file_name(self) -> &'static str {
        match self {
            OutputMode::AlphaCutout => ALPHA_OUTPUT,
            OutputMode::BackgroundReplacement => BACKGROUND_OUTPUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub mode: OutputMode,
    pub artifact: PathBuf,
    pub source_dimensions: (u32, u32),
    pub artifact_dimensions: (u32, u32),
    pub foreground_pixels: usize,
}

pub struct Pipeline<S: PreviewSink> {
    config: PipelineConfig,
    preview: S,
}

impl<S: PreviewSink> Pipeline<S> {
    pub fn new(config: PipelineConfig, preview: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, preview })
    }

    pub fn preview(&self) -> &S {
        &self.preview
    }

    /// Run the whole pipeline once.
    ///
    /// `acquire_model` is called after both images decoded successfully; the
    /// model it returns is dropped as soon as the probability grid exists.
    pub fn run<M, F>(
        &mut self,
        source: &dyn ImageSource,
        background: Option<&dyn ImageSource>,
        acquire_model: F,
    ) -> Result<PipelineReport>
    where
        M: SegmentationModel,
        F: FnOnce() -> Result<M>,
    {
        let image = source.load()?;
        tracing::info!(
            "Loaded {} ({}x{})",
            source.describe(),
            image.width(),
            image.height()
        );

        let background = match background {
            Some(background) => Some(self.load_background(background, &image)?),
            None => None,
        };

        let probabilities = {
            let mut model = acquire_model()?;
            model.segment(&image)?
        };
        composite::ensure_same_shape(image.dimensions(), probabilities.dimensions())?;

        let decision = mask::threshold(&probabilities, self.config.threshold);
        let foreground_pixels = decision.foreground_count();
        tracing::info!(
            "Threshold {}: {} of {} pixels foreground",
            self.config.threshold,
            foreground_pixels,
            image.width() as usize * image.height() as usize
        );

        let preview = composite::mask_preview(&decision, &self.config.mask_colors)?;
        let preview = resize_preserving_ratio(&preview, self.config.max_dimension);
        self.preview.show("mask", &DynamicImage::ImageRgb8(preview))?;

        let (mode, (artifact, artifact_dimensions)) = match background {
            None => {
                let cutout = composite::alpha_cutout(&image, &decision)?;
                let cutout = self.for_persistence(&cutout);
                let artifact =
                    self.persist(OutputMode::AlphaCutout, DynamicImage::ImageRgba8(cutout))?;
                (OutputMode::AlphaCutout, artifact)
            }
            Some(background) => {
                let replaced = composite::replace_background(&image, &background, &decision)?;
                let shown = resize_preserving_ratio(&replaced, self.config.max_dimension);
                let replaced = self.for_persistence(&replaced);
                let artifact = self.persist(
                    OutputMode::BackgroundReplacement,
                    DynamicImage::ImageRgb8(replaced),
                )?;
                self.preview.show("composite", &DynamicImage::ImageRgb8(shown))?;
                (OutputMode::BackgroundReplacement, artifact)
            }
        };

        Ok(PipelineReport {
            mode,
            artifact,
            source_dimensions: image.dimensions(),
            artifact_dimensions,
            foreground_pixels,
        })
    }

    fn persist(&self, mode: OutputMode, image: DynamicImage) -> Result<(PathBuf, (u32, u32))> {
        let path = self.config.output_dir.join(mode.file_name());
        save_png(&path, &image)?;
        Ok((path, (image.width(), image.height())))
    }

    fn load_background(&self, background: &dyn ImageSource, image: &RgbImage) -> Result<RgbImage> {
        let loaded = background.load()?;
        tracing::info!(
            "Loaded background {} ({}x{})",
            background.describe(),
            loaded.width(),
            loaded.height()
        );

        if loaded.dimensions() == image.dimensions() {
            return Ok(loaded);
        }

        match self.config.background_fit {
            BackgroundFit::Strict => {
                composite::ensure_same_shape(image.dimensions(), loaded.dimensions())?;
                Ok(loaded)
            }
            BackgroundFit::Stretch => {
                tracing::info!(
                    "Stretching background to {}x{}",
                    image.width(),
                    image.height()
                );
                Ok(imageops::resize(
                    &loaded,
                    image.width(),
                    image.height(),
                    imageops::FilterType::Triangle,
                ))
            }
        }
    }

    fn for_persistence<P>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
    ) -> ImageBuffer<P, Vec<P::Subpixel>>
    where
        P: Pixel + 'static,
        P::Subpixel: 'static,
    {
        match self.config.persist {
            PersistResolution::Resized => {
                resize_preserving_ratio(image, self.config.max_dimension)
            }
            PersistResolution::Source => image.clone(),
        }
    }
}
