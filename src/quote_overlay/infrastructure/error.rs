use std::path::PathBuf;

use thiserror::Error;
use crate::domain::error::DomainError; // UnsupportedGlyph などはレンダラーから返る

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Image could not be decoded: {0}")]
    InvalidImage(#[source] image::ImageError),

    #[error("Image could not be encoded: {0}")]
    EncodeError(#[source] image::ImageError),

    #[error("Failed to load font {path}: {reason}")]
    FontLoadError { path: PathBuf, reason: String },

    #[error("Data decoding failed: {0}")]
    DecodingError(String),

    #[error("Base64 decode error")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("{0}")]
    DomainErrorWrapper(#[from] DomainError),
}
