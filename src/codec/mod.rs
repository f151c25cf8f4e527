//! Image codec seam: decode uploaded bytes into rasters, resize them, and re-encode.

/// `ImageCodec` trait and the `image`-crate backed implementation.
pub mod image_codec;
