use crate::objects::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dangling object reference: {0}")]
    DanglingReference(ObjectId),

    #[error("Document is frozen: cannot {0}")]
    FrozenDocument(&'static str),

    #[error("Unbalanced graphics state: restore without matching save")]
    UnbalancedGraphicsState,

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Text layout error: {0}")]
    TextLayout(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
