use super::error::DomainError;

/// Vertical placement of the overlay box. The box is always centered horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxAnchor {
    Top,
    #[default]
    Center,
    Bottom,
}

impl BoxAnchor {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "top" => Ok(BoxAnchor::Top),
            "center" | "middle" => Ok(BoxAnchor::Center),
            "bottom" => Ok(BoxAnchor::Bottom),
            other => Err(DomainError::InvalidInput(format!("unknown box anchor: {}", other))),
        }
    }
}
