//! Editable scene model: one canvas plus an ordered stack of positioned, scaled layers.

/// JSON-facing scene description.
pub mod def;
/// Runtime scene, canvas and layer types with their edit commands.
pub mod model;
