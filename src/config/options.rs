//! Render options as a caller supplies them, and their validation into a [`RenderConfig`].
//!
//! [`RenderOptions`] holds plain numbers and strings with a serde default for every field, and
//! is filled from JSON or from the command line. Nothing downstream reads it directly:
//! [`RenderOptions::validate`] is the only way to obtain a [`RenderConfig`], and it runs before
//! any external process is started.

use std::path::{Path, PathBuf};

use crate::{
    compose::overlay::LegendMode,
    foundation::{
        core::{Canvas, FrameRate, Resolution},
        error::{ReelError, ReelResult},
    },
    log::sync::{DEFAULT_SYNC_SPAN, SyncMode},
    template::registry::{DEFAULT_TEMPLATE, TemplateDef, lookup},
};

/// Speed presets accepted by the x264 encoder.
pub const X264_PRESETS: [&str; 9] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Highest x264 constant-rate factor.
pub const MAX_CRF: u32 = 51;

/// Unvalidated render request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Encoded video path.
    pub output: PathBuf,
    /// Output resolution.
    pub resolution: Resolution,
    /// Frames per second.
    pub fps: u32,
    /// Title drawn by the renderer.
    pub title: String,
    /// Template name.
    pub template: String,
    /// Logo file path or `http(s)` URL.
    pub logo: Option<String>,
    /// Single repository: local path or remote URL.
    pub repo: Option<String>,
    /// Directory whose immediate subdirectories are repositories.
    pub multi_dir: Option<PathBuf>,
    /// Timing mode.
    pub sync_timing: SyncMode,
    /// Span in seconds every history is rescaled onto.
    pub sync_span: i64,
    /// Legend content.
    pub legend: LegendMode,
    /// Number of extension rows in the files legend.
    pub legend_limit: usize,
    /// Renderer `--seconds-per-day`.
    pub seconds_per_day: f64,
    /// Renderer `--time-scale`.
    pub time_scale: f64,
    /// Renderer `--user-scale`.
    pub user_scale: f64,
    /// Renderer `--auto-skip-seconds`.
    pub auto_skip: f64,
    /// x264 constant-rate factor.
    pub crf: u32,
    /// x264 speed preset.
    pub preset: String,
    /// Write the merged event log here before rendering.
    pub export_log: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output: "output.mp4".into(),
            resolution: Resolution::P1080,
            fps: FrameRate::default().get(),
            title: "Software Development".to_owned(),
            template: DEFAULT_TEMPLATE.to_owned(),
            logo: None,
            repo: None,
            multi_dir: None,
            sync_timing: SyncMode::Auto,
            sync_span: DEFAULT_SYNC_SPAN,
            legend: LegendMode::Auto,
            legend_limit: 8,
            seconds_per_day: 0.12,
            time_scale: 1.6,
            user_scale: 1.35,
            auto_skip: 0.5,
            crf: 22,
            preset: "medium".to_owned(),
            export_log: None,
        }
    }
}

/// Where the repositories of a render come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// One repository, local or remote.
    Single(String),
    /// Every repository directly under a directory.
    Multi(PathBuf),
}

/// Logo reference after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoRef {
    /// Fetched into the workspace at render time.
    Url(String),
    /// Existing, decodable image file.
    File(PathBuf),
}

/// Renderer flags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererTunables {
    /// `--seconds-per-day`.
    pub seconds_per_day: f64,
    /// `--time-scale`.
    pub time_scale: f64,
    /// `--user-scale`.
    pub user_scale: f64,
    /// `--auto-skip-seconds`.
    pub auto_skip: f64,
}

/// Encoder quality settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderTunables {
    /// Constant-rate factor, `0..=51`.
    pub crf: u32,
    /// One of [`X264_PRESETS`].
    pub preset: String,
}

impl EncoderTunables {
    /// `-vcodec libx264 -pix_fmt yuv420p -crf Q -preset P -bf 0`.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-vcodec".to_owned(),
            "libx264".to_owned(),
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
            "-crf".to_owned(),
            self.crf.to_string(),
            "-preset".to_owned(),
            self.preset.clone(),
            "-bf".to_owned(),
            "0".to_owned(),
        ]
    }
}

/// Validated, immutable render request.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Encoded video path.
    pub output: PathBuf,
    /// Output resolution.
    pub resolution: Resolution,
    /// Frames per second.
    pub fps: FrameRate,
    /// Title drawn by the renderer.
    pub title: String,
    /// Resolved template.
    pub template: &'static TemplateDef,
    /// Logo to overlay.
    pub logo: Option<LogoRef>,
    /// Repository source.
    pub source: Source,
    /// Requested timing mode.
    pub sync: SyncMode,
    /// Span in seconds for rescaled timelines.
    pub sync_span: i64,
    /// Requested legend.
    pub legend: LegendMode,
    /// Extension rows in the files legend.
    pub legend_limit: usize,
    /// Renderer flags.
    pub renderer: RendererTunables,
    /// Encoder settings.
    pub encoder: EncoderTunables,
    /// Merged log export path.
    pub export_log: Option<PathBuf>,
}

impl RenderConfig {
    /// Full output canvas.
    pub fn canvas(&self) -> Canvas {
        self.resolution.canvas()
    }

    /// Canvas the renderer draws at, inside the template's frame margin.
    pub fn inner_canvas(&self) -> Canvas {
        self.canvas().inset(self.template.margin())
    }
}

impl RenderOptions {
    /// Options for a single repository with every other field defaulted.
    pub fn for_repo(repo: impl Into<String>) -> Self {
        Self {
            repo: Some(repo.into()),
            ..Self::default()
        }
    }

    /// Options for a directory of repositories with every other field defaulted.
    pub fn for_multi_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            multi_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Check every field and resolve the template.
    pub fn validate(&self) -> ReelResult<RenderConfig> {
        let fps = FrameRate::new(self.fps)?;

        let source = match (&self.repo, &self.multi_dir) {
            (Some(repo), None) if !repo.trim().is_empty() => Source::Single(repo.trim().to_owned()),
            (Some(_), None) => {
                return Err(ReelError::configuration("repository reference is empty"));
            }
            (None, Some(dir)) => Source::Multi(dir.clone()),
            (Some(_), Some(_)) => {
                return Err(ReelError::configuration(
                    "a single repository and a multi-repository directory are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(ReelError::configuration(
                    "either a repository or a multi-repository directory is required",
                ));
            }
        };

        let template = lookup(&self.template)?;

        if self.legend_limit == 0 {
            return Err(ReelError::configuration("legend limit must be >= 1"));
        }
        if self.sync_span <= 0 {
            return Err(ReelError::configuration("sync span must be > 0 seconds"));
        }

        let renderer = RendererTunables {
            seconds_per_day: positive("seconds per day", self.seconds_per_day)?,
            time_scale: positive("time scale", self.time_scale)?,
            user_scale: positive("user scale", self.user_scale)?,
            auto_skip: positive("auto skip seconds", self.auto_skip)?,
        };

        if self.crf > MAX_CRF {
            return Err(ReelError::configuration(format!(
                "crf {} is outside 0..={MAX_CRF}",
                self.crf
            )));
        }
        if !X264_PRESETS.contains(&self.preset.as_str()) {
            return Err(ReelError::configuration(format!(
                "unknown x264 preset '{}' (expected one of: {})",
                self.preset,
                X264_PRESETS.join(", ")
            )));
        }

        let logo = self.logo.as_deref().map(validate_logo).transpose()?;

        Ok(RenderConfig {
            output: self.output.clone(),
            resolution: self.resolution,
            fps,
            title: self.title.clone(),
            template,
            logo,
            source,
            sync: self.sync_timing,
            sync_span: self.sync_span,
            legend: self.legend,
            legend_limit: self.legend_limit,
            renderer,
            encoder: EncoderTunables {
                crf: self.crf,
                preset: self.preset.clone(),
            },
            export_log: self.export_log.clone(),
        })
    }
}

fn positive(name: &str, value: f64) -> ReelResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ReelError::configuration(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

fn validate_logo(reference: &str) -> ReelResult<LogoRef> {
    if is_url(reference) {
        return Ok(LogoRef::Url(reference.to_owned()));
    }
    let path = expand_home(reference);
    if !path.is_file() {
        return Err(ReelError::configuration(format!(
            "logo file '{}' does not exist",
            path.display()
        )));
    }
    probe_logo(&path);
    Ok(LogoRef::File(path))
}

fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Whether `path` decodes as an image. A failed probe only warns; the encoder has the
/// final say.
pub(crate) fn probe_logo(path: &Path) -> bool {
    match image::image_dimensions(path) {
        Ok((width, height)) => {
            tracing::debug!(logo = %path.display(), width, height, "probed logo");
            true
        }
        Err(e) => {
            tracing::warn!(logo = %path.display(), error = %e, "logo is not a decodable image; passing it to the encoder as is");
            false
        }
    }
}

/// Expand a leading `~` to the home directory.
pub(crate) fn expand_home(reference: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (reference.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(reference),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
