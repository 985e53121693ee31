use std::{collections::HashSet, fmt};

use crate::foundation::error::{ReelError, ReelResult};

/// A stream label in the filter graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// Video stream of encoder input `k` (`[k:v]`).
    Input(usize),
    /// Label produced by a stage of this graph.
    Named(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(k) => write!(f, "[{k}:v]"),
            Self::Named(name) => write!(f, "[{name}]"),
        }
    }
}

/// One filter chain reading `inputs` and producing `outputs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stage {
    /// Labels consumed, in order.
    pub inputs: Vec<Label>,
    /// Comma-separated filter chain.
    pub chain: String,
    /// Labels produced; fresh for this graph.
    pub outputs: Vec<Label>,
}

/// Ordered filter stages plus the label holding the current final output.
///
/// Stages never name their inputs by convention: every input is a label some earlier stage
/// returned (or an encoder input), and [`FilterGraph::apply`] always reads the current output.
#[derive(Clone, Debug)]
pub struct FilterGraph {
    stages: Vec<Stage>,
    current: Label,
    next_id: usize,
}

impl FilterGraph {
    /// Empty graph whose current output is `input`.
    pub fn new(input: Label) -> Self {
        Self {
            stages: Vec::new(),
            current: input,
            next_id: 0,
        }
    }

    /// Label holding the graph's current final output.
    pub fn current(&self) -> &Label {
        &self.current
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// `true` when no stage was added.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn fresh(&mut self, hint: &str) -> Label {
        let label = Label::Named(format!("{hint}{}", self.next_id));
        self.next_id += 1;
        label
    }

    /// Add a stage producing one fresh label. The current output is unchanged.
    pub fn push(&mut self, inputs: Vec<Label>, chain: impl Into<String>, hint: &str) -> Label {
        let out = self.fresh(hint);
        self.stages.push(Stage {
            inputs,
            chain: chain.into(),
            outputs: vec![out.clone()],
        });
        out
    }

    /// Add a stage producing `count` fresh labels from one input.
    pub fn push_fanout(
        &mut self,
        input: Label,
        chain: impl Into<String>,
        count: usize,
        hint: &str,
    ) -> Vec<Label> {
        let outputs: Vec<Label> = (0..count).map(|_| self.fresh(hint)).collect();
        self.stages.push(Stage {
            inputs: vec![input],
            chain: chain.into(),
            outputs: outputs.clone(),
        });
        outputs
    }

    /// Apply `chain` to the current output and make its result current.
    pub fn apply(&mut self, chain: impl Into<String>, hint: &str) -> Label {
        let input = self.current.clone();
        let out = self.push(vec![input], chain, hint);
        self.current = out.clone();
        out
    }

    /// Overlay-style stage reading the current output plus `extra`; the result becomes current.
    pub fn apply_with(&mut self, extra: Label, chain: impl Into<String>, hint: &str) -> Label {
        let input = self.current.clone();
        let out = self.push(vec![input, extra], chain, hint);
        self.current = out.clone();
        out
    }

    /// Make a label returned by [`FilterGraph::push`] the current output.
    pub fn set_current(&mut self, label: Label) {
        self.current = label;
    }

    /// Check label threading: each named input was produced by an earlier stage and is
    /// consumed once, input streams are below `input_count`, and the current output exists.
    pub fn validate(&self, input_count: usize) -> ReelResult<()> {
        let mut produced: HashSet<&Label> = HashSet::new();
        let mut consumed: HashSet<&Label> = HashSet::new();

        let check_input = |label: &Label, produced: &HashSet<&Label>| -> ReelResult<()> {
            match label {
                Label::Input(k) if *k >= input_count => Err(ReelError::configuration(format!(
                    "filter graph reads {label} but only {input_count} inputs are provided"
                ))),
                Label::Input(_) => Ok(()),
                Label::Named(_) if produced.contains(label) => Ok(()),
                Label::Named(_) => Err(ReelError::configuration(format!(
                    "filter graph reads {label} before any stage produced it"
                ))),
            }
        };

        for stage in &self.stages {
            for label in &stage.inputs {
                check_input(label, &produced)?;
                if matches!(label, Label::Named(_)) && !consumed.insert(label) {
                    return Err(ReelError::configuration(format!(
                        "filter graph consumes {label} twice"
                    )));
                }
            }
            for label in &stage.outputs {
                if !produced.insert(label) {
                    return Err(ReelError::configuration(format!(
                        "filter graph produces {label} twice"
                    )));
                }
            }
        }
        check_input(&self.current, &produced)?;
        if consumed.contains(&self.current) {
            return Err(ReelError::configuration(format!(
                "filter graph output {} is consumed by a later stage",
                self.current
            )));
        }
        Ok(())
    }

    /// Render as `-filter_complex` text, or `None` for an empty graph.
    pub fn render(&self) -> Option<String> {
        if self.stages.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .stages
            .iter()
            .map(|s| {
                let mut out = String::new();
                for l in &s.inputs {
                    out.push_str(&l.to_string());
                }
                out.push_str(&s.chain);
                for l in &s.outputs {
                    out.push_str(&l.to_string());
                }
                out
            })
            .collect();
        Some(parts.join(";"))
    }

    /// Encoder arguments applying this graph: `-filter_complex <graph> -map <label>`.
    pub fn encoder_args(&self) -> Vec<String> {
        match self.render() {
            Some(graph) => vec![
                "-filter_complex".to_owned(),
                graph,
                "-map".to_owned(),
                self.current.to_string(),
            ],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/graph.rs"]
mod tests;
