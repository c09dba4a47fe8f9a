use super::preprocess::Preprocessor;
use super::types::{ProbabilityGrid, SegmentationModel};
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use image::RgbImage;
use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::value::Tensor;

/// Person segmentation backed by an ONNX export of MediaPipe selfie segmentation
///
/// The model is stateless: each image is segmented independently. The ONNX
/// session lives as long as the segmenter and is released when it is dropped.
pub struct SelfieSegmenter {
    session: Session,
    preprocessor: Preprocessor,
}

impl SelfieSegmenter {
    /// Load the model described by `config`
    ///
    /// # Default Configuration
    /// - Input size: 256x256
    /// - Layout: NHWC, values in [0, 1]
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let path = config.path.as_path();

        tracing::info!("Loading segmentation model from {}", path.display());

        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?;

        let session = register_execution_providers(builder)?.commit_from_file(path)?;

        tracing::info!(
            "Segmentation model loaded successfully (input {}x{}, {:?})",
            config.input_width,
            config.input_height,
            config.layout
        );

        let preprocessor =
            Preprocessor::new(config.input_width, config.input_height, config.layout);

        Ok(Self {
            session,
            preprocessor,
        })
    }
}

fn register_execution_providers(builder: SessionBuilder) -> Result<SessionBuilder> {
    #[allow(unused_mut)]
    let mut providers: Vec<ExecutionProviderDispatch> = Vec::new();

    #[cfg(feature = "tensorrt")]
    providers.push(ort::execution_providers::TensorRTExecutionProvider::default().build());
    #[cfg(feature = "cuda")]
    providers.push(ort::execution_providers::CUDAExecutionProvider::default().build());

    if providers.is_empty() {
        return Ok(builder);
    }

    tracing::debug!("Registering {} execution provider(s)", providers.len());
    Ok(builder.with_execution_providers(providers)?)
}

impl SegmentationModel for SelfieSegmenter {
    fn segment(&mut self, image: &RgbImage) -> Result<ProbabilityGrid> {
        let _span = tracing::debug_span!("selfie_segment").entered();

        let (width, height) = image.dimensions();
        tracing::info!("Image shape: {}x{}x3", height, width);

        let input = Tensor::from_array(self.preprocessor.preprocess(image))?;

        let infer_span = tracing::debug_span!("inference").entered();
        let outputs = self.session.run(ort::inputs![input])?;
        drop(infer_span);

        if outputs.len() == 0 {
            return Err(Error::OracleOutput("model returned no outputs".to_string()));
        }

        // Foreground confidence is the first (and usually only) output
        let matte = Preprocessor::extract_matte(outputs[0].try_extract_array::<f32>()?)?;
        tracing::debug!("Model matte: {}x{}", matte.width(), matte.height());

        Preprocessor::postprocess_matte(&matte, width, height)
    }
}

impl Drop for SelfieSegmenter {
    fn drop(&mut self) {
        tracing::debug!("Releasing segmentation session");
    }
}
