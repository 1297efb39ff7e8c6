use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Sub-image '{label}' is {found:?}, expected {expected:?} like the first grid cell")]
    DimensionMismatch {
        label: String,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Label font could not be parsed: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}

pub type Result<T> = std::result::Result<T, SegmentError>;
