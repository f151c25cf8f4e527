//! Export pipeline: flatten a scene or stored image, encode it, store it, and optionally point
//! an alias at the result.

/// `Exporter` and its request/response types.
pub mod pipeline;
