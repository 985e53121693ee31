//! Visual templates.

/// Multi-panel layouts of split templates.
pub mod layout;
/// Named template catalog.
pub mod registry;
