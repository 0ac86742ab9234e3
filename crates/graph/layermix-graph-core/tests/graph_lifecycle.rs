use layermix_graph_core::{
    AnimationTarget, BaseLayerSpec, ClipId, ClipRef, GraphError, NodeHandle, NodeKind,
    PlayableGraph, SampleSource,
};
use layermix_test_fixtures::{base_layers, clips};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn locomotion() -> BaseLayerSpec {
    base_layers::load("locomotion").expect("locomotion fixture")
}

/// Graph with an output bound to a 2-input mixer whose input 0 is the base layer.
fn two_input_graph() -> (PlayableGraph, NodeHandle, NodeHandle) {
    let mut g = PlayableGraph::create("test").unwrap();
    g.create_output("Animation", &AnimationTarget::new("hero"))
        .unwrap();
    let mixer = g.create_mixer(2).unwrap();
    g.set_output_source(mixer).unwrap();
    let base = g.create_base_layer(&locomotion()).unwrap();
    g.connect(mixer, 0, base).unwrap();
    g.set_input_weight(mixer, 0, 1.0).unwrap();
    (g, mixer, base)
}

#[test]
fn create_rejects_empty_name_and_missing_target() {
    assert_eq!(PlayableGraph::create("").unwrap_err(), GraphError::EmptyName);

    let mut g = PlayableGraph::create("g").unwrap();
    assert_eq!(
        g.create_output("Animation", &AnimationTarget::new("")),
        Err(GraphError::MissingTarget)
    );
    g.create_output("Animation", &AnimationTarget::new("hero"))
        .unwrap();
    assert!(matches!(
        g.create_output("Other", &AnimationTarget::new("hero")),
        Err(GraphError::OutputAlreadyBound { .. })
    ));
}

#[test]
fn evaluate_without_output_is_an_error() {
    let mut g = PlayableGraph::create("g").unwrap();
    assert_eq!(g.evaluate(0.016), Err(GraphError::NoOutput));
}

#[test]
fn mixer_inputs_track_connections_and_weights() {
    let (mut g, mixer, base) = two_input_graph();
    let wave: ClipRef = clips::load("wave").unwrap();
    let clip = g.create_clip(&wave).unwrap();

    assert_eq!(g.input_count(mixer).unwrap(), 2);
    assert_eq!(g.input_source(mixer, 0).unwrap(), Some(base));
    assert_eq!(g.input_source(mixer, 1).unwrap(), None);

    g.connect(mixer, 1, clip).unwrap();
    assert_eq!(g.input_source(mixer, 1).unwrap(), Some(clip));
    assert!(matches!(
        g.connect(mixer, 1, clip),
        Err(GraphError::SourceInUse { .. })
    ));

    let other = g.create_clip(&wave).unwrap();
    assert_eq!(
        g.connect(mixer, 1, other),
        Err(GraphError::InputOccupied { input: 1 })
    );
    assert_eq!(
        g.connect(mixer, 2, other),
        Err(GraphError::InputOutOfRange { input: 2, count: 2 })
    );
    assert!(matches!(
        g.connect(clip, 0, other),
        Err(GraphError::WrongNodeKind {
            expected: NodeKind::Mixer,
            actual: NodeKind::Clip,
            ..
        })
    ));

    g.set_input_weight(mixer, 1, 0.25).unwrap();
    approx(g.input_weight(mixer, 1).unwrap(), 0.25, 1e-6);
    assert!(matches!(
        g.set_input_weight(mixer, 1, f32::NAN),
        Err(GraphError::InvalidWeight { .. })
    ));

    assert_eq!(g.disconnect(mixer, 1).unwrap(), Some(clip));
    assert_eq!(g.disconnect(mixer, 1).unwrap(), None);
    // Once detached the clip can feed an input again.
    g.connect(mixer, 1, clip).unwrap();
}

#[test]
fn destroying_a_source_frees_its_input() {
    let (mut g, mixer, _base) = two_input_graph();
    let clip = g.create_clip(&clips::load("jump").unwrap()).unwrap();
    g.connect(mixer, 1, clip).unwrap();
    let before = g.node_count();

    g.destroy_node(clip).unwrap();
    assert_eq!(g.node_count(), before - 1);
    assert!(!g.is_node_valid(clip));
    assert_eq!(g.input_source(mixer, 1).unwrap(), None);
    assert_eq!(g.clip_of(clip), None);
}

#[test]
fn evaluate_weights_sources_by_path_product() {
    let (mut g, mixer, _base) = two_input_graph();
    let wave: ClipRef = clips::load("wave").unwrap();
    let clip = g.create_clip(&wave).unwrap();
    g.connect(mixer, 1, clip).unwrap();
    g.set_input_weight(mixer, 0, 0.75).unwrap();
    g.set_input_weight(mixer, 1, 0.25).unwrap();

    let sample = g.evaluate(0.1).unwrap();
    approx(sample.total_weight(), 1.0, 1e-6);
    approx(sample.base_weight(), 0.75, 1e-6);
    approx(sample.weight_of_clip(wave.id), 0.25, 1e-6);
    // Not playing yet: times stay at zero.
    assert!(sample.contributions.iter().all(|c| c.time == 0.0));

    g.play().unwrap();
    let sample = g.evaluate(0.5).unwrap();
    let clip_contrib = sample
        .contributions
        .iter()
        .find(|c| matches!(c.source, SampleSource::Clip { .. }))
        .unwrap();
    approx(clip_contrib.time, 0.5, 1e-6);

    // Zero-weight inputs do not contribute.
    g.set_input_weight(mixer, 1, 0.0).unwrap();
    let sample = g.evaluate(0.0).unwrap();
    assert_eq!(sample.contributions.len(), 1);
}

#[test]
fn clips_clamp_and_base_states_loop() {
    let (mut g, mixer, base) = two_input_graph();
    let jump: ClipRef = clips::load("jump").unwrap();
    let clip = g.create_clip(&jump).unwrap();
    g.connect(mixer, 1, clip).unwrap();
    g.play().unwrap();

    for _ in 0..30 {
        g.evaluate(0.1).unwrap();
    }
    approx(g.local_time(clip).unwrap(), 1.0, 1e-6);
    // idle loop is 2.0s long: 3.0s wraps to 1.0s.
    approx(g.local_time(base).unwrap(), 1.0, 1e-4);
}

#[test]
fn only_sources_wired_to_the_output_advance() {
    let (mut g, mixer, base) = two_input_graph();
    let wave: ClipRef = clips::load("wave").unwrap();
    let wired = g.create_clip(&wave).unwrap();
    let loose = g.create_clip(&wave).unwrap();
    g.connect(mixer, 1, wired).unwrap();
    // Connected at weight 0 still counts as wired.
    g.set_input_weight(mixer, 1, 0.0).unwrap();
    g.play().unwrap();

    g.evaluate(0.25).unwrap();
    approx(g.local_time(wired).unwrap(), 0.25, 1e-6);
    approx(g.local_time(base).unwrap(), 0.25, 1e-6);
    assert_eq!(g.local_time(loose), Some(0.0));

    g.disconnect(mixer, 1).unwrap();
    g.evaluate(0.25).unwrap();
    approx(g.local_time(wired).unwrap(), 0.25, 1e-6);
    approx(g.local_time(base).unwrap(), 0.5, 1e-6);
}

#[test]
fn base_state_switch_restarts_time() {
    let (mut g, _mixer, base) = two_input_graph();
    g.play().unwrap();
    g.evaluate(0.5).unwrap();
    assert_eq!(g.base_state(base), Some("idle"));

    g.set_base_state(base, "run").unwrap();
    assert_eq!(g.base_state(base), Some("run"));
    assert_eq!(g.local_time(base), Some(0.0));

    // run plays at 1.25x.
    let sample = g.evaluate(0.2).unwrap();
    approx(sample.contributions[0].time, 0.25, 1e-6);
    match &sample.contributions[0].source {
        SampleSource::BaseLayer { state, clip, .. } => {
            assert_eq!(state, "run");
            assert_eq!(*clip, ClipId(2));
        }
        other => panic!("unexpected source {other:?}"),
    }

    assert!(matches!(
        g.set_base_state(base, "swim"),
        Err(GraphError::UnknownState { .. })
    ));
}

#[test]
fn destroy_is_idempotent_and_invalidates_everything() {
    let (mut g, mixer, base) = two_input_graph();
    assert!(g.destroy());
    assert!(!g.destroy());
    assert!(!g.is_valid());
    assert!(!g.is_node_valid(mixer));
    assert!(!g.is_node_valid(base));
    assert_eq!(g.node_count(), 0);
    assert!(matches!(
        g.create_mixer(2),
        Err(GraphError::Destroyed { .. })
    ));
    assert!(matches!(g.evaluate(0.1), Err(GraphError::Destroyed { .. })));
}

#[test]
fn base_layer_json_is_validated() {
    let json = base_layers::json("locomotion").unwrap();
    let spec = BaseLayerSpec::from_json(&json).unwrap();
    assert_eq!(spec.states.len(), 3);
    assert_eq!(spec.default_state_index(), 0);

    let err = BaseLayerSpec::from_json(r#"{ "name": "empty", "states": [] }"#).unwrap_err();
    assert!(matches!(err, GraphError::InvalidBaseLayer { .. }));
    assert!(BaseLayerSpec::from_json("not json").is_err());
}

#[test]
fn single_state_layer_defaults_to_its_only_state() {
    let spec: BaseLayerSpec = base_layers::load("idle-only").unwrap();
    spec.validate().unwrap();
    let mut g = PlayableGraph::create("g").unwrap();
    let base = g.create_base_layer(&spec).unwrap();
    assert_eq!(g.base_state(base), Some("idle"));
    assert_eq!(g.node_kind(base), Some(NodeKind::BaseLayer));
    assert_eq!(g.clip_of(base), None);
}
