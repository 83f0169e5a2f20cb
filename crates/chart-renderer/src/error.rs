use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

impl From<RenderError> for ogc_common::OgcError {
    fn from(err: RenderError) -> Self {
        ogc_common::OgcError::GenerationFailure(format!("render failed: {}", err))
    }
}
