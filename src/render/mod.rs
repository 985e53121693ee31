//! Renderer and encoder orchestration.

/// Strategies and the render entry point.
pub mod pipeline;
pub(crate) mod process;
pub(crate) mod workspace;
