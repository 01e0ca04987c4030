/// Convenience result type used across photostrip.
pub type StripResult<T> = Result<T, StripError>;

/// Top-level error taxonomy for composition and publication.
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    /// Bad panel count, dimensions, colours or design strings.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The caller supplied a different number of frames than the style asks for.
    #[error("frame count mismatch: expected {expected} frames, got {actual}")]
    FrameCountMismatch {
        /// Panel count from the style.
        expected: usize,
        /// Number of frames actually supplied.
        actual: usize,
    },

    /// Filter name outside `none`, `grayscale`, `smoothing`.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// A pattern, logo, sticker or font could not be loaded or decoded.
    #[error("asset load failure: {0}")]
    AssetLoad(String),

    /// Rasterization failed (surface sizes, pixel buffers).
    #[error("render error: {0}")]
    Render(String),

    /// The final raster could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The object store rejected the upload.
    #[error("upload failure: {0}")]
    Upload(String),

    /// The object store could not mint a signed link.
    #[error("sign failure: {0}")]
    Sign(String),

    /// The remote object could not be deleted; the object may linger.
    #[error("deletion failure: {0}")]
    Deletion(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StripError {
    /// Build a [`StripError::InvalidConfig`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`StripError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`StripError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StripError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`StripError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`StripError::Sign`] value.
    pub fn sign(msg: impl Into<String>) -> Self {
        Self::Sign(msg.into())
    }

    /// Build a [`StripError::Deletion`] value.
    pub fn deletion(msg: impl Into<String>) -> Self {
        Self::Deletion(msg.into())
    }

    /// Return `true` for failures the publication manager recovers from by reverting to idle.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::Sign(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
