//! RGBA8 raster buffers and the pixel operations the compositor builds on.

/// The raster buffer type.
pub mod buffer;
/// Source-over blending and clipped blits.
pub mod composite;
/// Resampling through the `image` crate's filters.
pub mod resample;
