/// Convenience result type used across storycanvas.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by editor and rendering APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Invalid caller-provided data (sizes, ids, documents).
    #[error("validation error: {0}")]
    Validation(String),

    /// LUT file could not be turned into a usable table or shader.
    #[error("lut error: {0}")]
    Lut(String),

    /// Encoded asset bytes (image, svg, font) could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A render pass hit an internal inconsistency.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing scene documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::Lut`] value.
    pub fn lut(msg: impl Into<String>) -> Self {
        Self::Lut(msg.into())
    }

    /// Build a [`StoryError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StoryError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StoryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
