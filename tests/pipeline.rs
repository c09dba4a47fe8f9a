use std::cell::Cell;
use std::rc::Rc;

use bgswap::input::{FileImage, ImageSource};
use bgswap::output::{NoPreview, PreviewSink};
use bgswap::pipeline::{ALPHA_OUTPUT, BACKGROUND_OUTPUT};
use bgswap::{
    BackgroundFit, Error, OutputMode, PersistResolution, Pipeline, PipelineConfig,
    ProbabilityGrid, SegmentationModel,
};
use image::{ColorType, DynamicImage, Rgb, RgbImage};

/// Returns the same probability for every pixel.
struct UniformModel {
    probability: f32,
    released: Rc<Cell<bool>>,
}

impl SegmentationModel for UniformModel {
    fn segment(&mut self, image: &RgbImage) -> bgswap::Result<ProbabilityGrid> {
        Ok(ProbabilityGrid::filled(
            image.width(),
            image.height(),
            self.probability,
        ))
    }
}

impl Drop for UniformModel {
    fn drop(&mut self) {
        self.released.set(true);
    }
}

/// Fails every inference.
struct BrokenModel;

impl SegmentationModel for BrokenModel {
    fn segment(&mut self, _image: &RgbImage) -> bgswap::Result<ProbabilityGrid> {
        Err(Error::OracleOutput("inference failed".to_string()))
    }
}

#[derive(Default)]
struct RecordingPreview {
    shown: Vec<(String, DynamicImage)>,
}

impl PreviewSink for RecordingPreview {
    fn show(&mut self, title: &str, image: &DynamicImage) -> bgswap::Result<()> {
        self.shown.push((title.to_string(), image.clone()));
        Ok(())
    }
}

fn source_image() -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x * y) % 239) as u8])
    })
}

fn background_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([12, 90, 200]))
}

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        output_dir: dir.to_path_buf(),
        persist: PersistResolution::Source,
        ..PipelineConfig::default()
    }
}

fn uniform(probability: f32) -> impl FnOnce() -> bgswap::Result<UniformModel> {
    move || {
        Ok(UniformModel {
            probability,
            released: Rc::new(Cell::new(false)),
        })
    }
}

#[test]
fn low_threshold_keeps_source_and_shows_white_mask() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let background = background_image(640, 480);
    let mut pipeline = Pipeline::new(config_in(dir.path()), RecordingPreview::default()).unwrap();

    let report = pipeline
        .run(&source, Some(&background), uniform(0.5))
        .unwrap();

    assert_eq!(report.mode, OutputMode::BackgroundReplacement);
    assert_eq!(report.artifact, dir.path().join(BACKGROUND_OUTPUT));
    assert_eq!(report.foreground_pixels, 640 * 480);

    let written = image::open(&report.artifact).unwrap();
    assert_eq!(written.color(), ColorType::Rgb8);
    assert_eq!(written.to_rgb8(), source);

    let shown = &pipeline.preview().shown;
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].0, "mask");
    assert!(shown[0]
        .1
        .to_rgb8()
        .pixels()
        .all(|p| *p == Rgb([255, 255, 255])));
    assert_eq!(shown[1].0, "composite");
}

#[test]
fn high_threshold_takes_background_and_shows_gray_mask() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let background = background_image(640, 480);
    let config = PipelineConfig {
        threshold: 0.9,
        ..config_in(dir.path())
    };
    let mut pipeline = Pipeline::new(config, RecordingPreview::default()).unwrap();

    let report = pipeline
        .run(&source, Some(&background), uniform(0.5))
        .unwrap();

    assert_eq!(report.foreground_pixels, 0);
    assert_eq!(image::open(&report.artifact).unwrap().to_rgb8(), background);

    let mask = pipeline.preview().shown[0].1.to_rgb8();
    assert!(mask.pixels().all(|p| *p == Rgb([192, 192, 192])));
}

#[test]
fn probability_equal_to_threshold_is_background() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let config = PipelineConfig {
        threshold: 0.5,
        ..config_in(dir.path())
    };
    let mut pipeline = Pipeline::new(config, NoPreview).unwrap();

    let report = pipeline.run(&source, None, uniform(0.5)).unwrap();

    assert_eq!(report.foreground_pixels, 0);
    let cutout = image::open(&report.artifact).unwrap().to_rgba8();
    assert!(cutout.pixels().all(|p| p[3] == 0));
}

#[test]
fn missing_background_writes_alpha_cutout() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let mut pipeline = Pipeline::new(config_in(dir.path()), RecordingPreview::default()).unwrap();

    let report = pipeline.run(&source, None, uniform(0.5)).unwrap();

    assert_eq!(report.mode, OutputMode::AlphaCutout);
    assert_eq!(report.artifact, dir.path().join(ALPHA_OUTPUT));
    assert!(!dir.path().join(BACKGROUND_OUTPUT).exists());

    let written = image::open(&report.artifact).unwrap();
    assert_eq!(written.color(), ColorType::Rgba8);
    let cutout = written.to_rgba8();
    for (x, y, pixel) in cutout.enumerate_pixels() {
        assert_eq!(&pixel.0[..3], &source.get_pixel(x, y).0);
        assert_eq!(pixel[3], 255);
    }

    // Only the mask preview is shown in cutout mode
    assert_eq!(pipeline.preview().shown.len(), 1);
}

#[test]
fn mismatched_background_is_reported_before_segmentation() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let background = background_image(320, 240);
    let mut pipeline = Pipeline::new(config_in(dir.path()), RecordingPreview::default()).unwrap();
    let acquired = Cell::new(false);

    let err = pipeline
        .run(&source, Some(&background), || {
            acquired.set(true);
            uniform(0.5)()
        })
        .unwrap_err();

    match err {
        Error::ShapeMismatch { expected, actual } => {
            assert_eq!(expected, (640, 480));
            assert_eq!(actual, (320, 240));
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
    assert!(!acquired.get());
    assert!(!dir.path().join(BACKGROUND_OUTPUT).exists());
    assert!(pipeline.preview().shown.is_empty());
}

#[test]
fn stretch_fit_resizes_background() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let background = background_image(320, 240);
    let config = PipelineConfig {
        threshold: 0.9,
        background_fit: BackgroundFit::Stretch,
        ..config_in(dir.path())
    };
    let mut pipeline = Pipeline::new(config, NoPreview).unwrap();

    let report = pipeline
        .run(&source, Some(&background), uniform(0.5))
        .unwrap();

    let written = image::open(&report.artifact).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (640, 480));
    assert!(written.pixels().all(|p| *p == Rgb([12, 90, 200])));
}

#[test]
fn resized_persistence_caps_longer_side() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let config = PipelineConfig {
        persist: PersistResolution::Resized,
        ..config_in(dir.path())
    };
    let mut pipeline = Pipeline::new(config, RecordingPreview::default()).unwrap();

    let report = pipeline.run(&source, None, uniform(0.5)).unwrap();

    assert_eq!(report.source_dimensions, (640, 480));
    assert_eq!(report.artifact_dimensions, (480, 360));
    let written = image::open(&report.artifact).unwrap();
    assert_eq!((written.width(), written.height()), (480, 360));
    assert_eq!(pipeline.preview().shown[0].1.width(), 480);
}

#[test]
fn model_is_released_after_segmentation() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let released = Rc::new(Cell::new(false));
    let seen_by_preview = Rc::new(Cell::new(false));

    struct CheckingPreview {
        released: Rc<Cell<bool>>,
        seen: Rc<Cell<bool>>,
    }

    impl PreviewSink for CheckingPreview {
        fn show(&mut self, _title: &str, _image: &DynamicImage) -> bgswap::Result<()> {
            self.seen.set(self.released.get());
            Ok(())
        }
    }

    let preview = CheckingPreview {
        released: Rc::clone(&released),
        seen: Rc::clone(&seen_by_preview),
    };
    let mut pipeline = Pipeline::new(config_in(dir.path()), preview).unwrap();
    let model_released = Rc::clone(&released);

    pipeline
        .run(&source, None, move || {
            Ok(UniformModel {
                probability: 1.0,
                released: model_released,
            })
        })
        .unwrap();

    assert!(seen_by_preview.get());
}

#[test]
fn missing_input_file_fails_before_model() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileImage::new(dir.path().join("absent.jpg"));
    let mut pipeline = Pipeline::new(config_in(dir.path()), NoPreview).unwrap();

    let err = pipeline
        .run(&source, None, || -> bgswap::Result<UniformModel> {
            panic!("model must not be acquired")
        })
        .unwrap_err();

    assert!(matches!(err, Error::InputNotFound { .. }));
}

#[test]
fn decodes_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("portrait.png");
    let background_path = dir.path().join("beach.png");
    source_image().save(&source_path).unwrap();
    background_image(640, 480).save(&background_path).unwrap();

    let source = FileImage::new(&source_path);
    let background = FileImage::new(&background_path);
    let mut pipeline = Pipeline::new(config_in(dir.path()), NoPreview).unwrap();

    let report = pipeline
        .run(&source, Some(&background), uniform(0.0))
        .unwrap();

    assert_eq!(
        image::open(&report.artifact).unwrap().to_rgb8(),
        background_image(640, 480)
    );
}

#[test]
fn invalid_config_is_rejected() {
    let config = PipelineConfig {
        max_dimension: 0,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        Pipeline::new(config, NoPreview),
        Err(Error::InvalidConfig(_))
    ));
}

fn assert_nothing_written(dir: &std::path::Path) {
    assert!(!dir.join(ALPHA_OUTPUT).exists());
    assert!(!dir.join(BACKGROUND_OUTPUT).exists());
}

#[test]
fn model_load_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let background = background_image(640, 480);
    let mut pipeline = Pipeline::new(config_in(dir.path()), RecordingPreview::default()).unwrap();

    for background in [None, Some(&background)] {
        let err = pipeline
            .run(&source, background.map(|b| b as &dyn ImageSource), || {
                Err::<BrokenModel, _>(Error::OracleOutput("no session".to_string()))
            })
            .unwrap_err();

        assert!(matches!(err, Error::OracleOutput(ref msg) if msg == "no session"));
        assert_nothing_written(dir.path());
        assert!(pipeline.preview().shown.is_empty());
    }
}

#[test]
fn segmentation_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_image();
    let background = background_image(640, 480);
    let mut pipeline = Pipeline::new(config_in(dir.path()), RecordingPreview::default()).unwrap();

    for background in [None, Some(&background)] {
        let err = pipeline
            .run(&source, background.map(|b| b as &dyn ImageSource), || {
                Ok(BrokenModel)
            })
            .unwrap_err();

        assert!(matches!(err, Error::OracleOutput(ref msg) if msg == "inference failed"));
        assert_nothing_written(dir.path());
        assert!(pipeline.preview().shown.is_empty());
    }
}
