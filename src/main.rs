use anyhow::{Context, Result};
use bgswap::config::{self, DEFAULT_MAX_DIMENSION, DEFAULT_THRESHOLD};
use bgswap::input::{FileImage, ImageSource};
use bgswap::output::{NoPreview, PreviewSink, ViewerPreview};
use bgswap::segmentation;
use bgswap::{
    BackgroundFit, MaskColors, ModelConfig, PersistResolution, Pipeline, PipelineConfig,
    TensorLayout,
};
use clap::Parser;
use image::Rgb;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Remove or replace the background of a portrait", long_about = None)]
struct Args {
    /// Path to the input image
    #[arg(short, long)]
    image: PathBuf,

    /// Path to the background image
    /// If not provided, writes a transparent cutout instead
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Threshold to classify foreground and background
    #[arg(short, long, visible_alias = "thresshold", default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    threshold: f32,

    /// Path to segmentation model (ONNX file)
    #[arg(short, long, default_value = "models/selfie_segmentation.onnx")]
    model: PathBuf,

    /// Model input width
    #[arg(long, default_value_t = 256)]
    model_width: u32,

    /// Model input height
    #[arg(long, default_value_t = 256)]
    model_height: u32,

    /// Model input tensor layout
    #[arg(long, value_enum, default_value_t = TensorLayout::Nhwc)]
    layout: TensorLayout,

    /// Threads used by ONNX Runtime within one operator
    #[arg(long, default_value_t = 4)]
    intra_threads: usize,

    /// Longer side of previews and saved images
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION, value_parser = clap::value_parser!(u32).range(1..))]
    max_size: u32,

    /// Mask preview color of foreground pixels (R,G,B)
    #[arg(long, value_parser = config::parse_rgb, default_value = "255,255,255")]
    mask_color: Rgb<u8>,

    /// Mask preview color of background pixels (R,G,B)
    #[arg(long, value_parser = config::parse_rgb, default_value = "192,192,192")]
    mask_background: Rgb<u8>,

    /// Directory the output image is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Save the output at the source resolution instead of the preview size
    #[arg(long)]
    full_resolution: bool,

    /// Stretch a background of a different size to the source dimensions
    #[arg(long)]
    fit_background: bool,

    /// Do not open preview windows
    #[arg(long)]
    no_preview: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("bgswap starting");

    let config = PipelineConfig {
        threshold: args.threshold,
        max_dimension: args.max_size,
        mask_colors: MaskColors {
            foreground: args.mask_color,
            background: args.mask_background,
        },
        output_dir: args.output_dir.clone(),
        persist: if args.full_resolution {
            PersistResolution::Source
        } else {
            PersistResolution::Resized
        },
        background_fit: if args.fit_background {
            BackgroundFit::Stretch
        } else {
            BackgroundFit::Strict
        },
    };

    if args.no_preview {
        run(&args, config, NoPreview)
    } else {
        let preview = ViewerPreview::new().context("Failed to prepare preview")?;
        run(&args, config, preview)
    }
}

fn run<S: PreviewSink>(args: &Args, config: PipelineConfig, preview: S) -> Result<()> {
    let model_config = ModelConfig {
        input_width: args.model_width,
        input_height: args.model_height,
        layout: args.layout,
        intra_threads: args.intra_threads,
        ..ModelConfig::new(&args.model)
    };

    let mut pipeline = Pipeline::new(config, preview).context("Invalid configuration")?;

    let source = FileImage::new(&args.image);
    let background = args.background.as_ref().map(FileImage::new);

    let report = pipeline
        .run(
            &source,
            background.as_ref().map(|b| b as &dyn ImageSource),
            || segmentation::create_default_model(&model_config),
        )
        .context("Background removal failed")?;

    tracing::info!(
        "{:?}: {} ({}x{} from {}x{} source)",
        report.mode,
        report.artifact.display(),
        report.artifact_dimensions.0,
        report.artifact_dimensions.1,
        report.source_dimensions.0,
        report.source_dimensions.1
    );

    Ok(())
}
