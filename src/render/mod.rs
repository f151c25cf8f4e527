//! Scene flattening.

/// CPU compositor turning a scene into a single raster.
pub mod compositor;
