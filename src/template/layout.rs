use crate::compose::graph::{FilterGraph, Label};

const XSTACK_2X2: &str = "xstack=inputs=4:layout=0_0|w0_0|0_h0|w0_h0";

/// Multi-panel layouts used by split templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    /// 2x2 grid with a different grade per panel.
    Quad,
    /// Two panels side by side.
    Vertical,
    /// Wide left panel plus two narrow crops.
    Triple,
    /// Full panel with a picture-in-picture inset.
    Focus,
    /// 2x2 grid of green-graded panels under a grid overlay.
    Matrix,
}

impl Layout {
    /// Number of panels, which is also the number of distinct inputs the layout can take.
    pub fn panels(self) -> usize {
        self.panel_filters().len()
    }

    fn panel_filters(self) -> &'static [&'static str] {
        match self {
            Self::Quad => &[
                "scale=iw/2:ih/2,eq=saturation=1.25:contrast=1.1",
                "scale=iw/2:ih/2,hue=s=0,eq=contrast=1.2",
                "scale=iw/2:ih/2,colorbalance=rs=.12:gs=-.02:bs=-.08",
                "scale=iw/2:ih/2,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.2:gg=1.0:gb=0.05:br=0:bg=0:bb=0",
            ],
            Self::Vertical => &[
                "eq=saturation=1.3:contrast=1.12",
                "hue=s=0,eq=contrast=1.25",
            ],
            Self::Triple => &[
                "crop=iw/2:ih:0:0,eq=saturation=1.22:contrast=1.08",
                "crop=iw/4:ih:iw/4:0,hue=s=0,eq=contrast=1.2",
                "crop=iw/4:ih:3*iw/4:0,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.18:gg=1.0:gb=0.05:br=0:bg=0:bb=0",
            ],
            Self::Focus => &[
                "scale=iw:ih,eq=saturation=1.18:contrast=1.1,drawbox=x=8:y=8:w=iw-16:h=ih-16:color=#87b7ff@0.35:t=3",
                "scale=iw/3:ih/3,hue=s=0,eq=contrast=1.24",
            ],
            Self::Matrix => &[
                "scale=iw/2:ih/2,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.2:gg=1.0:gb=0.05:br=0:bg=0:bb=0",
                "scale=iw/2:ih/2,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.15:gg=0.9:gb=0.03:br=0:bg=0:bb=0",
                "scale=iw/2:ih/2,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.22:gg=1.05:gb=0.07:br=0:bg=0:bb=0",
                "scale=iw/2:ih/2,colorchannelmixer=rr=0:rg=0:rb=0:gr=0.18:gg=0.95:gb=0.05:br=0:bg=0:bb=0",
            ],
        }
    }

    fn combine(self) -> String {
        match self {
            Self::Quad => XSTACK_2X2.to_owned(),
            Self::Vertical => "hstack=inputs=2".to_owned(),
            Self::Triple => "hstack=inputs=3".to_owned(),
            Self::Focus => "overlay=W-w-28:28".to_owned(),
            Self::Matrix => format!("{XSTACK_2X2},drawgrid=w=64:h=28:t=1:c=#00ff66@0.12"),
        }
    }

    /// Add this layout's stages to `graph` and make the combined output current.
    ///
    /// With `distinct_inputs` panel `k` reads encoder input `k`; otherwise the current output
    /// is fanned out with `split` and every panel reads one copy.
    pub fn build(self, graph: &mut FilterGraph, distinct_inputs: bool) {
        let n = self.panels();
        let sources: Vec<Label> = if distinct_inputs {
            (0..n).map(Label::Input).collect()
        } else {
            let input = graph.current().clone();
            graph.push_fanout(input, format!("split={n}"), n, "fan")
        };

        let panels: Vec<Label> = sources
            .into_iter()
            .zip(self.panel_filters())
            .map(|(src, chain)| graph.push(vec![src], *chain, "panel"))
            .collect();
        let out = graph.push(panels, self.combine(), "layout");
        graph.set_current(out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/layout.rs"]
mod tests;
