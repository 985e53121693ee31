use crate::{
    compose::{
        graph::{FilterGraph, Label},
        overlay::{
            LEGEND_STYLE, LegendMode, LegendSource, RELATION_STYLE, TextBox, legend_lines,
            relationship_lines,
        },
    },
    foundation::{core::Canvas, error::ReelResult},
    log::{event::EventLog, sync::EffectiveSync},
    template::registry::{TemplateDef, TemplateKind, Treatment},
};

/// Everything the composer needs to build one render's filter graph.
#[derive(Clone, Copy, Debug)]
pub struct ComposeInputs<'a> {
    /// Resolved template.
    pub template: &'a TemplateDef,
    /// Full output canvas.
    pub canvas: Canvas,
    /// Number of video encoder inputs (1, or the panel count for multi-panel renders).
    pub video_inputs: usize,
    /// Requested legend content.
    pub legend: LegendMode,
    /// Extension rows in the files legend.
    pub legend_limit: usize,
    /// Contributing repository names in render order.
    pub repos: &'a [String],
    /// Effective timing mode.
    pub sync: EffectiveSync,
    /// Merged event log.
    pub log: &'a EventLog,
    /// Whether a logo input follows the video inputs.
    pub logo: bool,
}

/// Build the filter graph: base look, legend, relationships, logo, in that order.
///
/// Each stage reads the graph's current output and replaces it. The result is validated
/// against the number of encoder inputs before it is returned.
pub fn compose(inputs: &ComposeInputs<'_>) -> ReelResult<FilterGraph> {
    let mut graph = FilterGraph::new(Label::Input(0));

    match inputs.template.treatment {
        Treatment::Layout(layout) => {
            let distinct = inputs.video_inputs >= layout.panels();
            layout.build(&mut graph, distinct);
        }
        Treatment::Cosmetic(_) => {
            if let Some(chain) = inputs.template.cosmetic_filter(inputs.canvas) {
                graph.apply(chain, "base");
            }
        }
    }

    let legend = legend_lines(
        inputs.legend.resolve(inputs.template.kind),
        &LegendSource {
            repos: inputs.repos,
            sync: inputs.sync,
            log: inputs.log,
            limit: inputs.legend_limit,
        },
    );
    if !legend.is_empty() {
        let text_box = TextBox::layout(&legend, inputs.canvas, &LEGEND_STYLE);
        graph.apply(text_box.filter(&legend, LEGEND_STYLE.border), "legend");
    }

    if inputs.template.kind == TemplateKind::Relation && inputs.repos.len() >= 2 {
        let lines = relationship_lines(inputs.repos);
        let text_box = TextBox::layout(&lines, inputs.canvas, &RELATION_STYLE);
        graph.apply(text_box.filter(&lines, RELATION_STYLE.border), "relation");
    }

    let input_count = inputs.video_inputs + usize::from(inputs.logo);
    if inputs.logo {
        let logo = graph.push(
            vec![Label::Input(inputs.video_inputs)],
            format!("scale=-1:{}/8", inputs.canvas.height),
            "logo",
        );
        graph.apply_with(logo, "overlay=W-w-40:H-h-40", "branded");
    }

    graph.validate(input_count)?;
    Ok(graph)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
