//! Encoders for flattened rasters.
//!
//! GIF has no alpha channel, only one "transparent" palette index per frame, so the single-play
//! exporter first binarizes alpha against a reserved key color.

/// Alpha binarization onto a reserved key color.
pub mod color_key;
/// Two-frame, play-once "appear then vanish" GIF export.
pub mod gif;
