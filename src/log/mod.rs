//! Event logs: the text format, timeline synchronization, and multi-repository merging.

/// Log entries and their line format.
pub mod event;
/// Path prefixing and chronological merge.
pub mod merge;
/// Rescaling onto a shared span and marker injection.
pub mod sync;
