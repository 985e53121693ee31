use std::{fmt, str::FromStr};

use crate::foundation::error::{ReelError, ReelResult};

/// Output resolution preset.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum Resolution {
    /// 3840x2160
    #[serde(rename = "2160p")]
    #[value(name = "2160p")]
    P2160,
    /// 2560x1440
    #[serde(rename = "1440p")]
    #[value(name = "1440p")]
    P1440,
    /// 1920x1080
    #[serde(rename = "1080p")]
    #[value(name = "1080p")]
    P1080,
    /// 1280x720
    #[serde(rename = "720p")]
    #[value(name = "720p")]
    P720,
}

impl Resolution {
    /// Every supported preset, largest first.
    pub const ALL: [Resolution; 4] = [Self::P2160, Self::P1440, Self::P1080, Self::P720];

    /// Pixel dimensions `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::P2160 => (3840, 2160),
            Self::P1440 => (2560, 1440),
            Self::P1080 => (1920, 1080),
            Self::P720 => (1280, 720),
        }
    }

    /// Full output canvas for this preset.
    pub fn canvas(self) -> Canvas {
        let (width, height) = self.dimensions();
        Canvas { width, height }
    }

    /// Preset name as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P2160 => "2160p",
            Self::P1440 => "1440p",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ReelError;

    fn from_str(s: &str) -> ReelResult<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ReelError::configuration(format!(
                    "unsupported resolution '{s}' (supported: 2160p, 1440p, 1080p, 720p)"
                ))
            })
    }
}

/// Output frame rate. Only 25, 30 and 60 fps are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FrameRate(u32);

impl FrameRate {
    /// Accepted frame rates.
    pub const ALLOWED: [u32; 3] = [25, 30, 60];

    /// Validate a frame rate.
    pub fn new(fps: u32) -> ReelResult<Self> {
        if !Self::ALLOWED.contains(&fps) {
            return Err(ReelError::configuration(format!(
                "unsupported fps {fps} (supported: 25, 30, 60)"
            )));
        }
        Ok(Self(fps))
    }

    /// Frames per second.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(60)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> serde::Deserialize<'de> for FrameRate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fps = u32::deserialize(deserializer)?;
        Self::new(fps).map_err(serde::de::Error::custom)
    }
}

/// Pixel canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas shrunk by `margin` pixels on every side.
    pub fn inset(self, margin: u32) -> Canvas {
        Canvas {
            width: self.width.saturating_sub(margin * 2),
            height: self.height.saturating_sub(margin * 2),
        }
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
