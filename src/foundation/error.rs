/// Convenience result type used across bookmock.
pub type BookmockResult<T> = Result<T, BookmockError>;

/// Top-level error taxonomy used by compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum BookmockError {
    /// Invalid user-provided values (sizes, colors, dimensions).
    #[error("validation error: {0}")]
    Validation(String),

    /// A binding type was asked to assemble without an input it requires.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An uploaded byte stream could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while drawing a scene into a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while producing export artifacts from a frame.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BookmockError {
    /// Build a [`BookmockError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BookmockError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`BookmockError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`BookmockError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BookmockError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`BookmockError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
