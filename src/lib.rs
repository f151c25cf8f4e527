//! Snapfade composes layered raster scenes and exports them as static images or as two-frame
//! GIFs that show once and then vanish.
//!
//! The pieces:
//!
//! - Build a [`Scene`] from stored images (or load a [`SceneDef`] from JSON)
//! - Flatten it with a [`Compositor`] at any output scale
//! - Encode the result with [`export_single_play`] or an [`ImageCodec`], usually through an
//!   [`Exporter`] that also stores it and updates an alias
//! - Serve names through a [`Resolver`]: reserved route, then alias, then direct image
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image decode, resize and encode.
pub mod codec;
/// GIF export.
pub mod encode;
/// Store-and-alias export pipeline.
pub mod export;
/// Raster buffers and pixel operations.
pub mod raster;
/// Scene flattening.
pub mod render;
/// Request name resolution.
pub mod resolve;
/// Editable scene model.
pub mod scene;
/// Image and alias storage.
pub mod store;

pub use crate::foundation::core::{Background, Point, Rgb8, Size, Vec2};
pub use crate::foundation::error::{SnapfadeError, SnapfadeResult};

pub use crate::codec::image_codec::{
    DecodedImage, Fit, ImageCodec, ImageRsCodec, OutputFormat, sniff_mime,
};
pub use crate::encode::color_key::{ColorKeyOpts, apply_color_key};
pub use crate::encode::gif::{GIF_MIME, SinglePlayOpts, export_single_play};
pub use crate::export::pipeline::{
    ExportOutcome, ExportResponse, ExportSource, Exporter, GifExportRequest, StaticExportRequest,
};
pub use crate::raster::buffer::RasterBuffer;
pub use crate::raster::resample::ResizeFilter;
pub use crate::render::compositor::{
    Compositor, CompositorOpts, RenderLimits, RenderOutput, RenderWarning, render,
};
pub use crate::resolve::resolver::{CachePolicy, Resolution, ResolvedImage, Resolver};
pub use crate::resolve::route::Route;
pub use crate::scene::def::{CanvasDef, LayerDef, SceneDef};
pub use crate::scene::model::{Canvas, Layer, Scene};
pub use crate::store::alias::{Alias, AliasStore, AliasTable, MemoryAliasStore};
pub use crate::store::blob::{BlobEntry, BlobStore, MemoryBlobStore, StoredImage};
pub use crate::store::content::ContentStore;
pub use crate::store::fs::{FsAliasStore, FsBlobStore, open_fs_stores};
