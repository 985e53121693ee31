//! Filter graph composition for the encoder.

/// Stage ordering: base look, legend, relationships, logo.
pub mod composer;
/// Labelled filter stages and their text form.
pub mod graph;
/// Legend and relationship text boxes.
pub mod overlay;
/// Extension and action tallies.
pub mod stats;
