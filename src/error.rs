use std::path::PathBuf;

/// Errors produced while segmenting, compositing or persisting an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image path does not exist.
    #[error("input image not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// The image exists but could not be decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Two grids taking part in one composite differ in width or height.
    #[error(
        "shape mismatch: expected {}x{}, got {}x{}",
        expected.0,
        expected.1,
        actual.0,
        actual.1
    )]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// The segmentation model could not be loaded or run.
    #[error("segmentation model unavailable: {0}")]
    OracleUnavailable(#[from] ort::Error),

    /// The segmentation model produced something we cannot interpret.
    #[error("unexpected segmentation output: {0}")]
    OracleOutput(String),

    /// Writing an output artifact failed.
    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The interactive preview could not be shown.
    #[error("preview failed: {0}")]
    Preview(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
