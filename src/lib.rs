//! commitreel renders repository history videos by driving `gource` and `ffmpeg`.
//!
//! A render goes through a fixed sequence:
//!
//! - Validate [`RenderOptions`] into a [`RenderConfig`] before anything is spawned
//! - Collect one event log per repository, rescale them onto a shared timeline, and merge
//! - Compose the template's filter graph (look, legend, relationships, logo)
//! - Pipe renderer frames into the encoder, or render panels and compose them
//!
//! [`RenderPipeline::render`] runs all of it and returns a [`RenderReport`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Filter graph composition.
pub mod compose;
/// Options, validation and the external toolchain.
pub mod config;
/// Event log format, synchronization and merging.
pub mod log;
/// Renderer and encoder orchestration.
pub mod render;
/// Repository resolution and log collection.
pub mod repo;
/// Template catalog and layouts.
pub mod template;

pub use crate::foundation::core::{Canvas, FrameRate, Resolution};
pub use crate::foundation::error::{ReelError, ReelResult, Stage};

pub use crate::compose::graph::{FilterGraph, Label};
pub use crate::compose::overlay::LegendMode;
pub use crate::config::options::{RenderConfig, RenderOptions, Source};
pub use crate::config::tools::Toolchain;
pub use crate::log::event::{Action, EventLog, EventLogEntry};
pub use crate::log::sync::{EffectiveSync, SyncMode};
pub use crate::render::pipeline::{MergedLog, RenderPipeline, RenderReport, Strategy};
pub use crate::template::registry::{TemplateDef, TemplateKind, lookup, templates};
