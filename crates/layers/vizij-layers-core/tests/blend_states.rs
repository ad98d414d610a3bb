use vizij_layers_core::{
    Blend2dState, BlendAxis, EasingFn, FreeBlendState, SingleState, State, StateOptions, TimedClip,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn clip(name: &str) -> State {
    SingleState::new(name, TimedClip::looping(1.0), StateOptions::default()).into()
}

fn weights(blend: &Blend2dState) -> Vec<f32> {
    blend
        .states()
        .values()
        .map(|state| state.borrow().weight())
        .collect()
}

fn triangle_tree() -> Blend2dState {
    Blend2dState::new(
        "locomotion",
        StateOptions::weighted(1.0),
        vec![clip("idle"), clip("right"), clip("up")],
        vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        vec![],
    )
    .expect("valid blend tree")
}

#[test]
fn centroid_weights_are_equal_thirds() {
    let mut blend = triangle_tree();
    blend.set_blend_value(BlendAxis::X, 1.0 / 3.0, 0.0, EasingFn::default());
    blend.set_blend_value(BlendAxis::Y, 1.0 / 3.0, 0.0, EasingFn::default());
    for w in weights(&blend) {
        approx(w, 1.0 / 3.0, 1e-5);
    }
}

#[test]
fn outside_point_falls_back_to_nearest_edge() {
    let mut blend = triangle_tree();
    blend.set_blend_value(BlendAxis::X, -0.5, 0.0, EasingFn::default());
    let w = weights(&blend);
    approx(w.iter().sum::<f32>(), 1.0, 1e-5);
    approx(w[0], 1.0, 1e-5);
    assert!(w.iter().all(|w| *w >= 0.0));
}

#[test]
fn two_children_project_onto_the_segment() {
    let mut blend = Blend2dState::new(
        "lean",
        StateOptions::weighted(1.0),
        vec![clip("left"), clip("right")],
        vec![[-1.0, 0.0], [1.0, 0.0]],
        vec![],
    )
    .unwrap();
    blend.set_blend_value(BlendAxis::X, 0.5, 0.0, EasingFn::default());
    blend.set_blend_value(BlendAxis::Y, 3.0, 0.0, EasingFn::default());
    let w = weights(&blend);
    approx(w[0], 0.25, 1e-5);
    approx(w[1], 0.75, 1e-5);
}

#[test]
fn tweened_blend_value_updates_weights_each_tick() {
    let mut blend = triangle_tree();
    blend.play();
    let tween = blend.set_blend_value(BlendAxis::X, 1.0, 1.0, EasingFn::default());
    blend.update(500.0);
    approx(blend.blend_value(BlendAxis::X), 0.5, 1e-5);
    let w = weights(&blend);
    approx(w[0], 0.5, 1e-5);
    approx(w[1], 0.5, 1e-5);

    blend.update(500.0);
    assert!(tween.is_completed());
    approx(weights(&blend)[1], 1.0, 1e-5);
}

#[test]
fn phase_matching_follows_the_heaviest_child() {
    let mut blend = Blend2dState::new(
        "gait",
        StateOptions::weighted(1.0),
        vec![
            SingleState::new("walk", TimedClip::looping(1.0), StateOptions::default()).into(),
            SingleState::new("run", TimedClip::looping(0.5), StateOptions::default()).into(),
        ],
        vec![[0.0, 0.0], [1.0, 0.0]],
        vec![true, true],
    )
    .unwrap();
    blend.set_blend_value(BlendAxis::X, 0.25, 0.0, EasingFn::default());
    blend.play();
    blend.update(250.0);

    assert_eq!(blend.phase_lead().as_deref(), Some("walk"));
    let walk = blend.state("walk").unwrap().borrow().normalized_time();
    let run = blend.state("run").unwrap().borrow().normalized_time();
    assert_eq!(walk, run);
    approx(walk.unwrap_or_default(), 0.25, 1e-5);
}

#[test]
fn free_blend_normalizes_weights_above_one() {
    let mut blend = FreeBlendState::new(
        "face",
        StateOptions::weighted(1.0),
        [clip("smile"), clip("blink")],
    );
    blend.set_blend_weight("smile", 1.0, 0.0, EasingFn::default());
    blend.set_blend_weight("blink", 1.0, 0.0, EasingFn::default());
    blend.update_internal_weight(1.0);

    let smile = blend.state("smile").unwrap().borrow().internal_weight();
    let blink = blend.state("blink").unwrap().borrow().internal_weight();
    approx(smile, 0.5, 1e-6);
    approx(blink, 0.5, 1e-6);
}

#[test]
fn free_blend_keeps_weights_below_one() {
    let mut blend = FreeBlendState::new(
        "face",
        StateOptions::weighted(0.5),
        [clip("smile"), clip("blink")],
    );
    blend.set_blend_weight("smile", 0.4, 0.0, EasingFn::default());
    blend.update_internal_weight(1.0);
    let smile = blend.state("smile").unwrap().borrow().internal_weight();
    approx(smile, 0.2, 1e-6);
}

#[test]
fn unknown_free_blend_child_is_rejected() {
    let mut blend = FreeBlendState::new("face", StateOptions::default(), [clip("smile")]);
    assert!(blend
        .set_blend_weight("frown", 1.0, 0.0, EasingFn::default())
        .is_rejected());
    assert!(blend.blend_weight("frown").is_err());
}
