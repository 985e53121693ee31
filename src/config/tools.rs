use std::path::PathBuf;

/// External binaries a render drives.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Toolchain {
    /// Version-control client used to clone remote sources.
    pub git: PathBuf,
    /// Log generator and visualization renderer.
    pub gource: PathBuf,
    /// Video encoder.
    pub ffmpeg: PathBuf,
    /// Fetcher for logo URLs.
    pub curl: PathBuf,
    /// Virtual display wrapper for the renderer; `None` runs it directly.
    pub display_wrapper: Option<PathBuf>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            git: "git".into(),
            gource: "gource".into(),
            ffmpeg: "ffmpeg".into(),
            curl: "curl".into(),
            display_wrapper: Some("xvfb-run".into()),
        }
    }
}

impl Toolchain {
    /// Same tools, renderer run without a virtual display.
    pub fn without_display_wrapper(mut self) -> Self {
        self.display_wrapper = None;
        self
    }
}
