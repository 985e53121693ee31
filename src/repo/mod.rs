//! Repository discovery and raw log collection.

/// Resolve references, enumerate directories, generate logs.
pub mod collect;
