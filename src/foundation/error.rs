/// Convenience result type used across snapfade.
pub type SnapfadeResult<T> = Result<T, SnapfadeError>;

/// Top-level error taxonomy used by compositor, exporter, store and resolver APIs.
#[derive(thiserror::Error, Debug)]
pub enum SnapfadeError {
    /// A source raster could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Non-positive or oversized canvas/layer/output dimensions, or a bad scale factor.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A codec or the animation encoder rejected the raster.
    #[error("encode error: {0}")]
    Encode(String),

    /// A name resolved to nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying storage refused a write.
    #[error("store write error: {0}")]
    StoreWrite(String),

    /// Invalid user-provided data (names, slugs, MIME types, scene JSON).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnapfadeError {
    /// Build a [`SnapfadeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SnapfadeError::InvalidGeometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Build a [`SnapfadeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SnapfadeError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`SnapfadeError::StoreWrite`] value.
    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }

    /// Build a [`SnapfadeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for [`SnapfadeError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
