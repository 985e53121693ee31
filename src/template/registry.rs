use std::fmt;

use crate::{
    foundation::core::Canvas,
    foundation::error::{ReelError, ReelResult},
    template::layout::Layout,
};

/// Template used when none is requested.
pub const DEFAULT_TEMPLATE: &str = "urandom";
/// Border thickness reserved by templates that pad the rendered canvas.
pub const FRAME_MARGIN: u32 = 26;

const W: &str = "{w}";
const H: &str = "{h}";
const MARGIN: &str = "{margin}";

/// Template family; drives sync/legend defaults and the composer's base stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Single-repository look.
    Core,
    /// Multi-repository overlay look.
    Compare,
    /// Multi-panel layout.
    Split,
    /// Compare look plus inferred repository relationships.
    Relation,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Core => "core",
            Self::Compare => "compare",
            Self::Split => "split",
            Self::Relation => "relation",
        })
    }
}

/// How a template turns rendered frames into its look.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Treatment {
    /// Single-stream filter chain with `{w}`, `{h}` and `{margin}` placeholders.
    Cosmetic(&'static str),
    /// Multi-stream layout.
    Layout(Layout),
}

/// A registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateDef {
    /// Lookup name.
    pub name: &'static str,
    /// Family.
    pub kind: TemplateKind,
    /// Filter fragment or layout.
    pub treatment: Treatment,
}

impl TemplateDef {
    const fn cosmetic(name: &'static str, kind: TemplateKind, filter: &'static str) -> Self {
        Self {
            name,
            kind,
            treatment: Treatment::Cosmetic(filter),
        }
    }

    const fn split(name: &'static str, layout: Layout) -> Self {
        Self {
            name,
            kind: TemplateKind::Split,
            treatment: Treatment::Layout(layout),
        }
    }

    /// Frame margin in pixels: non-zero only when the cosmetic filter pads by the margin.
    pub fn margin(&self) -> u32 {
        match self.treatment {
            Treatment::Cosmetic(filter) if filter.contains(MARGIN) => FRAME_MARGIN,
            _ => 0,
        }
    }

    /// Layout of a split template.
    pub fn layout(&self) -> Option<Layout> {
        match self.treatment {
            Treatment::Layout(layout) => Some(layout),
            Treatment::Cosmetic(_) => None,
        }
    }

    /// Number of input streams the base stage can consume as distinct sources.
    pub fn input_streams(&self) -> usize {
        self.layout().map_or(1, Layout::panels)
    }

    /// Cosmetic filter with placeholders substituted for `canvas`, or `None` when the
    /// template has no single-stream filter.
    pub fn cosmetic_filter(&self, canvas: Canvas) -> Option<String> {
        let Treatment::Cosmetic(filter) = self.treatment else {
            return None;
        };
        if filter.is_empty() {
            return None;
        }
        Some(
            filter
                .replace(W, &canvas.width.to_string())
                .replace(H, &canvas.height.to_string())
                .replace(MARGIN, &self.margin().to_string()),
        )
    }
}

use TemplateKind::{Compare, Core, Relation};

static TEMPLATES: &[TemplateDef] = &[
    TemplateDef::cosmetic("none", Core, ""),
    TemplateDef::cosmetic(
        "urandom",
        Core,
        "pad={w}:{h}:{margin}:{margin}:#05070b,eq=saturation=1.18:contrast=1.12:brightness=-0.01,\
         curves=all='0/0 0.28/0.18 0.72/0.9 1/1',\
         drawgrid=w=72:h=72:t=1:c=#00ffd0@0.08,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#00ffd0@0.36:t=4,\
         drawbox=x=10:y=10:w=iw-20:h=ih-20:color=#7c3aed@0.22:t=2",
    ),
    TemplateDef::cosmetic(
        "border",
        Core,
        "pad={w}:{h}:{margin}:{margin}:#222226,drawbox=x=0:y=0:w=iw:h=ih:color=#4d4d54@0.85:t=5",
    ),
    TemplateDef::cosmetic(
        "neon",
        Core,
        "pad={w}:{h}:{margin}:{margin}:#05030d,eq=saturation=1.45:contrast=1.20:brightness=-0.02,\
         curves=all='0/0 0.35/0.22 0.7/0.88 1/1',drawgrid=w=80:h=80:t=1:c=#00ffd0@0.12,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#00ffd0@0.55:t=6",
    ),
    TemplateDef::cosmetic(
        "sunset",
        Core,
        "colorbalance=rs=.12:gs=-.02:bs=-.10,eq=saturation=1.30:contrast=1.08:brightness=0.01,\
         vignette=PI/7",
    ),
    TemplateDef::cosmetic(
        "matrix",
        Core,
        "hue=s=0,curves=all='0/0 1/0.95',\
         colorchannelmixer=rr=0:rg=0:rb=0:gr=0.15:gg=1.0:gb=0.05:br=0:bg=0:bb=0,\
         noise=alls=8:allf=t,drawgrid=w=64:h=28:t=1:c=#00ff66@0.09",
    ),
    TemplateDef::cosmetic(
        "blueprint",
        Core,
        "pad={w}:{h}:{margin}:{margin}:#0b1e3f,\
         colorchannelmixer=rr=0.10:rg=0.12:rb=0.30:gr=0.12:gg=0.50:gb=0.75:br=0.35:bg=0.55:bb=1.00,\
         eq=saturation=0.75:contrast=1.12,drawgrid=w=90:h=90:t=1:c=#9fd0ff@0.16,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#9fd0ff@0.45:t=5",
    ),
    TemplateDef::cosmetic(
        "noir",
        Core,
        "hue=s=0,eq=contrast=1.25:brightness=-0.04,gblur=sigma=0.45,vignette=PI/5,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#ffffff@0.12:t=2",
    ),
    TemplateDef::cosmetic(
        "compare-panel",
        Compare,
        "pad={w}:{h}:{margin}:{margin}:#1a1a21,eq=saturation=1.05:contrast=1.06,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#90b4ff@0.35:t=4",
    ),
    TemplateDef::cosmetic(
        "compare-neon",
        Compare,
        "pad={w}:{h}:{margin}:{margin}:#03060c,eq=saturation=1.4:contrast=1.2,\
         drawgrid=w=70:h=70:t=1:c=#00ffd0@0.1,drawbox=x=0:y=0:w=iw:h=ih:color=#00ffd0@0.45:t=5",
    ),
    TemplateDef::cosmetic(
        "compare-blueprint",
        Compare,
        "pad={w}:{h}:{margin}:{margin}:#0b1e3f,\
         colorchannelmixer=rr=0.10:rg=0.12:rb=0.30:gr=0.12:gg=0.50:gb=0.75:br=0.35:bg=0.55:bb=1.00,\
         eq=saturation=0.8:contrast=1.12,drawgrid=w=84:h=84:t=1:c=#9fd0ff@0.16,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#9fd0ff@0.45:t=5",
    ),
    TemplateDef::cosmetic(
        "compare-matrix",
        Compare,
        "hue=s=0,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.17:gg=1.0:gb=0.05:br=0:bg=0:bb=0,\
         noise=alls=6:allf=t,drawgrid=w=64:h=28:t=1:c=#00ff66@0.09,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#00ff66@0.28:t=4",
    ),
    TemplateDef::cosmetic(
        "compare-noir",
        Compare,
        "hue=s=0,eq=contrast=1.25:brightness=-0.04,gblur=sigma=0.45,vignette=PI/5,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#ffffff@0.22:t=3",
    ),
    TemplateDef::cosmetic(
        "relation-panel",
        Relation,
        "pad={w}:{h}:{margin}:{margin}:#1a1a21,eq=saturation=1.08:contrast=1.08,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#90b4ff@0.35:t=4",
    ),
    TemplateDef::cosmetic(
        "relation-neon",
        Relation,
        "pad={w}:{h}:{margin}:{margin}:#03060c,eq=saturation=1.4:contrast=1.2,\
         drawgrid=w=70:h=70:t=1:c=#00ffd0@0.1,drawbox=x=0:y=0:w=iw:h=ih:color=#00ffd0@0.45:t=5",
    ),
    TemplateDef::cosmetic(
        "relation-blueprint",
        Relation,
        "pad={w}:{h}:{margin}:{margin}:#0b1e3f,\
         colorchannelmixer=rr=0.10:rg=0.12:rb=0.30:gr=0.12:gg=0.50:gb=0.75:br=0.35:bg=0.55:bb=1.00,\
         eq=saturation=0.8:contrast=1.12,drawgrid=w=84:h=84:t=1:c=#9fd0ff@0.16,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#9fd0ff@0.45:t=5",
    ),
    TemplateDef::cosmetic(
        "relation-noir",
        Relation,
        "pad={w}:{h}:{margin}:{margin}:#151515,hue=s=0,eq=contrast=1.22:brightness=-0.03,\
         vignette=PI/6,drawbox=x=0:y=0:w=iw:h=ih:color=#e6e6e6@0.28:t=4",
    ),
    TemplateDef::cosmetic(
        "relation-sunset",
        Relation,
        "pad={w}:{h}:{margin}:{margin}:#24121a,colorbalance=rs=.15:gs=-.03:bs=-.10,\
         eq=saturation=1.26:contrast=1.08,vignette=PI/7,\
         drawbox=x=0:y=0:w=iw:h=ih:color=#ffb06a@0.35:t=4",
    ),
    TemplateDef::split("split-quad", Layout::Quad),
    TemplateDef::split("split-vertical", Layout::Vertical),
    TemplateDef::split("split-triple", Layout::Triple),
    TemplateDef::split("split-focus", Layout::Focus),
    TemplateDef::split("split-matrix", Layout::Matrix),
];

/// All registered templates in catalog order.
pub fn templates() -> &'static [TemplateDef] {
    TEMPLATES
}

/// Look up a template by name.
pub fn lookup(name: &str) -> ReelResult<&'static TemplateDef> {
    TEMPLATES.iter().find(|t| t.name == name).ok_or_else(|| {
        let known: Vec<&str> = TEMPLATES.iter().map(|t| t.name).collect();
        ReelError::configuration(format!(
            "unknown template '{name}' (known: {})",
            known.join(", ")
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/template/registry.rs"]
mod tests;
