//! Text-box annotations drawn over the video: the legend and the relationship panel.

use crate::{
    compose::stats::{action_counts, top_extensions},
    foundation::core::Canvas,
    log::{event::EventLog, sync::EffectiveSync},
    template::registry::TemplateKind,
};

/// Distance kept between text boxes and the canvas edge.
const EDGE: u32 = 18;
const BACKGROUND: &str = "#000000@0.42";
const FONT: &str = "DejaVu Sans";

/// Escape text for a `drawtext` value inside a filter graph.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            ',' => out.push_str("\\,"),
            '\'' => out.push_str("\\\\'"),
            '[' => out.push_str("\\["),
            ']' => out.push_str("\\]"),
            '%' => out.push_str("\\%"),
            c => out.push(c),
        }
    }
    out
}

/// Which canvas edge a text box hugs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxAnchor {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
}

/// Look of an annotation box; sizes switch on canvas height.
#[derive(Clone, Copy, Debug)]
pub struct BoxStyle {
    /// Edge the box hugs.
    pub anchor: BoxAnchor,
    /// Minimum box width.
    pub min_width: u32,
    /// Minimum box height.
    pub min_height: u32,
    /// `(font, spacing)` for canvases at least 1080 px tall.
    pub large: (u32, u32),
    /// `(font, spacing)` for smaller canvases.
    pub small: (u32, u32),
    /// Border color.
    pub border: &'static str,
}

/// Legend look.
pub const LEGEND_STYLE: BoxStyle = BoxStyle {
    anchor: BoxAnchor::TopLeft,
    min_width: 360,
    min_height: 120,
    large: (24, 10),
    small: (18, 8),
    border: "#d8e7ff@0.24",
};

/// Relationship panel look.
pub const RELATION_STYLE: BoxStyle = BoxStyle {
    anchor: BoxAnchor::TopRight,
    min_width: 420,
    min_height: 120,
    large: (20, 8),
    small: (16, 6),
    border: "#ffd28a@0.24",
};

/// Resolved geometry of one annotation box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextBox {
    /// Box left edge.
    pub x: u32,
    /// Box top edge.
    pub y: u32,
    /// Box width.
    pub width: u32,
    /// Box height.
    pub height: u32,
    /// Font size.
    pub font: u32,
    /// Extra space between lines.
    pub spacing: u32,
    /// First line origin.
    pub text_x: u32,
    /// First line origin.
    pub text_y: u32,
}

impl TextBox {
    /// Size and place a box for `lines` on `canvas`.
    pub fn layout(lines: &[String], canvas: Canvas, style: &BoxStyle) -> Self {
        let (font, spacing) = if canvas.height >= 1080 {
            style.large
        } else {
            style.small
        };
        let max_chars = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
        let line_count = lines.len() as u32;

        let width = style
            .min_width
            .max(90 + max_chars * (font / 2 + 4))
            .min(canvas.width.saturating_sub(EDGE * 2));
        let height = style
            .min_height
            .max(48 + line_count * (font + spacing))
            .min(canvas.height.saturating_sub(EDGE * 2));

        let (x, text_x, text_y) = match style.anchor {
            BoxAnchor::TopLeft => (EDGE, EDGE + 16, EDGE + 16),
            BoxAnchor::TopRight => {
                let x = canvas.width.saturating_sub(width + EDGE);
                (x, x + EDGE, EDGE * 2)
            }
        };

        Self {
            x,
            y: EDGE,
            width,
            height,
            font,
            spacing,
            text_x,
            text_y,
        }
    }

    /// Filter chain drawing the background, the border, and one `drawtext` per non-empty line.
    pub fn filter(&self, lines: &[String], border: &str) -> String {
        let mut chain = format!(
            "drawbox=x={x}:y={y}:w={w}:h={h}:color={BACKGROUND}:t=fill,\
             drawbox=x={x}:y={y}:w={w}:h={h}:color={border}:t=2",
            x = self.x,
            y = self.y,
            w = self.width,
            h = self.height,
        );
        let mut y = self.text_y;
        for line in lines {
            if !line.is_empty() {
                chain.push_str(&format!(
                    ",drawtext=font='{FONT}':text='{}':x={}:y={y}:fontsize={}:fontcolor=white:text_shaping=0",
                    escape_drawtext(line),
                    self.text_x,
                    self.font,
                ));
            }
            y += self.font + self.spacing;
        }
        chain
    }
}

/// Requested legend content.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LegendMode {
    /// `Repos` for multi-repository template kinds, otherwise `None`.
    #[default]
    Auto,
    /// No legend.
    None,
    /// Contributing repositories and timing mode.
    Repos,
    /// Most frequent file extensions.
    Files,
    /// Action tallies.
    Actions,
    /// Every section.
    All,
}

impl LegendMode {
    /// Resolve `Auto` for a template of `kind`.
    pub fn resolve(self, kind: TemplateKind) -> Self {
        match self {
            Self::Auto if kind == TemplateKind::Core => Self::None,
            Self::Auto => Self::Repos,
            other => other,
        }
    }

    fn includes(self, section: Self) -> bool {
        self == section || self == Self::All
    }
}

/// Everything the legend text is derived from.
#[derive(Clone, Copy, Debug)]
pub struct LegendSource<'a> {
    /// Contributing repository names.
    pub repos: &'a [String],
    /// Effective timing mode.
    pub sync: EffectiveSync,
    /// Merged event log.
    pub log: &'a EventLog,
    /// Number of extension rows.
    pub limit: usize,
}

/// Legend lines for a resolved `mode`; sections are separated by a blank line.
///
/// Returns an empty list for [`LegendMode::None`] and [`LegendMode::Auto`].
pub fn legend_lines(mode: LegendMode, src: &LegendSource<'_>) -> Vec<String> {
    let mut sections: Vec<Vec<String>> = Vec::new();

    if mode.includes(LegendMode::Repos) && !src.repos.is_empty() {
        let mut lines = vec!["REPOS".to_owned(), String::new()];
        lines.extend(src.repos.iter().map(|r| format!("- {r}")));
        if src.sync.is_unified() {
            lines.push(String::new());
            lines.push("timing: unified".to_owned());
            if src.sync == EffectiveSync::Smart {
                lines.push("sync: smart blank-log pulses".to_owned());
            }
        }
        sections.push(lines);
    }

    if mode.includes(LegendMode::Files) {
        let top = top_extensions(src.log, src.limit);
        if !top.is_empty() {
            let mut lines = vec!["FILE TYPES".to_owned(), String::new()];
            lines.extend(top.iter().map(|(label, n)| format!("- {label}: {n}")));
            sections.push(lines);
        }
    }

    if mode.includes(LegendMode::Actions) {
        let counts = action_counts(src.log);
        if !counts.is_empty() {
            let mut lines = vec!["ACTIONS".to_owned(), String::new()];
            lines.extend(counts.iter().map(|(a, n)| format!("- {}: {n}", a.label())));
            sections.push(lines);
        }
    }

    sections.join(&String::new())
}

/// Maximum number of inferred relationships listed.
pub const MAX_RELATIONSHIPS: usize = 8;
/// Shown when no pair of repositories looks related.
pub const RELATION_FALLBACK: &str = "Similar stack family inferred from naming and cadence";

fn base_name(name: &str) -> &str {
    name.strip_suffix("-nix").unwrap_or(name)
}

fn relate(a: &str, b: &str) -> Option<String> {
    let (abase, bbase) = (base_name(a), base_name(b));
    if abase.contains(bbase) || bbase.contains(abase) {
        return Some(format!("{a} <-> {b} (variant line)"));
    }
    abase
        .split('-')
        .find(|tok| tok.len() >= 4 && bbase.contains(tok))
        .map(|tok| format!("{a} <-> {b} (shared: {tok})"))
}

/// Name-based relationships between every pair of repositories, at most `max`.
///
/// Pairs are visited outer-before-inner in the given order. Falls back to a single generic
/// line when nothing matches.
pub fn infer_relationships(names: &[String], max: usize) -> Vec<String> {
    let mut found = Vec::new();
    'outer: for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            if found.len() >= max {
                break 'outer;
            }
            if let Some(rel) = relate(a, b) {
                found.push(rel);
            }
        }
    }
    if found.is_empty() {
        found.push(RELATION_FALLBACK.to_owned());
    }
    found
}

/// Relationship panel lines: heading, blank line, one bullet per relationship.
pub fn relationship_lines(names: &[String]) -> Vec<String> {
    let mut lines = vec!["RELATIONSHIPS".to_owned(), String::new()];
    lines.extend(
        infer_relationships(names, MAX_RELATIONSHIPS)
            .into_iter()
            .map(|r| format!("- {r}")),
    );
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/compose/overlay.rs"]
mod tests;
