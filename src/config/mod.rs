//! Render configuration: caller options, validation, and the external toolchain.

/// Caller-facing options and their validated form.
pub mod options;
/// External binaries.
pub mod tools;
