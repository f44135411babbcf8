use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Quote text must not be empty")]
    EmptyText,

    // フォントにグリフが無い文字
    #[error("Unsupported character {0:?}: the configured font has no glyph for it")]
    UnsupportedGlyph(char),
}
