/// Convenience result type used across biofx.
pub type FxResult<T> = Result<T, FxError>;

/// Error taxonomy for the fallible edges of the engine.
///
/// Per-frame effect code never returns these: it clamps, falls back or idles instead.
/// Errors surface only when loading configuration, inserting assets or rasterizing.
#[derive(thiserror::Error, Debug)]
pub enum FxError {
    /// Invalid user-provided configuration or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image or SVG could not be decoded or resolved.
    #[error("asset error: {0}")]
    Asset(String),

    /// Rasterization failed (surface limits, buffer mismatch).
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    /// Build a [`FxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FxError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FxError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for FxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
