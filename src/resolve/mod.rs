//! Decides what a requested name refers to: a reserved operation, an alias, a stored image, or
//! nothing.

/// Ordered name resolution over the content store and alias table.
pub mod resolver;
/// Reserved operation names.
pub mod route;
