use super::*;

#[test]
fn empty_graph_renders_nothing() {
    let g = FilterGraph::new(Label::Input(0));
    assert!(g.is_empty());
    assert!(g.render().is_none());
    assert!(g.encoder_args().is_empty());
    g.validate(1).unwrap();
}

#[test]
fn apply_threads_current_label() {
    let mut g = FilterGraph::new(Label::Input(0));
    let a = g.apply("hue=s=0", "base");
    let b = g.apply("vignette", "legend");
    assert_ne!(a, b);
    assert_eq!(g.stages()[1].inputs, vec![a.clone()]);
    assert_eq!(g.current(), &b);
    assert_eq!(g.render().unwrap(), "[0:v]hue=s=0[base0];[base0]vignette[legend1]");
    assert_eq!(
        g.encoder_args(),
        vec!["-filter_complex", "[0:v]hue=s=0[base0];[base0]vignette[legend1]", "-map", "[legend1]"]
    );
    g.validate(1).unwrap();
}

#[test]
fn fanout_and_combine() {
    let mut g = FilterGraph::new(Label::Input(0));
    let fans = g.push_fanout(Label::Input(0), "split=2", 2, "fan");
    let panels: Vec<Label> = fans
        .into_iter()
        .map(|l| g.push(vec![l], "null", "panel"))
        .collect();
    let out = g.push(panels, "hstack=inputs=2", "layout");
    g.set_current(out);
    assert_eq!(
        g.render().unwrap(),
        "[0:v]split=2[fan0][fan1];[fan0]null[panel2];[fan1]null[panel3];[panel2][panel3]hstack=inputs=2[layout4]"
    );
    g.validate(1).unwrap();
}

#[test]
fn validate_rejects_unproduced_and_reused_labels() {
    let mut g = FilterGraph::new(Label::Input(0));
    g.push(vec![Label::Named("outv".into())], "null", "x");
    assert!(g.validate(1).is_err());

    let mut g = FilterGraph::new(Label::Input(0));
    let a = g.push(vec![Label::Input(0)], "null", "a");
    g.push(vec![a.clone()], "null", "b");
    g.push(vec![a], "null", "c");
    assert!(g.validate(1).is_err());

    let mut g = FilterGraph::new(Label::Input(0));
    g.apply_with(Label::Input(2), "overlay", "logo");
    assert!(g.validate(2).is_err());
    g.validate(3).unwrap();
}

#[test]
fn validate_rejects_consumed_final_output() {
    let mut g = FilterGraph::new(Label::Input(0));
    let a = g.apply("null", "a");
    g.push(vec![a], "null", "b");
    assert!(g.validate(1).is_err());
}
