use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vizij_layers_core::{
    BlendAxis, BlendMode, Blend2dState, Config, EasingFn, LayerOptions, LayerStack, SingleState,
    State, StateOptions, TimedClip,
};

fn clip(name: &str, seconds: f32) -> State {
    SingleState::new(name, TimedClip::looping(seconds), StateOptions::default()).into()
}

fn build_stack(layers: usize) -> LayerStack {
    let mut stack = LayerStack::new(Config::default());
    for i in 0..layers {
        let options = LayerOptions {
            blend_mode: if i % 2 == 0 {
                BlendMode::Override
            } else {
                BlendMode::Additive
            },
            ..LayerOptions::default()
        };
        let layer = stack.add_layer(&format!("layer{i}"), options, None);

        let tree = Blend2dState::new(
            "locomotion",
            StateOptions::default(),
            vec![
                clip("idle", 2.0),
                clip("walk", 1.0),
                clip("run", 0.6),
                clip("strafe", 0.8),
            ],
            vec![[0.0, 0.0], [0.0, 1.0], [0.0, 2.0], [1.0, 1.0]],
            vec![false, true, true, true],
        )
        .expect("valid thresholds");
        stack.add_animation(&layer, tree.into()).expect("layer exists");
        stack.add_animation(&layer, clip("wave", 1.5)).expect("layer exists");
        stack.play_animation(&layer, "locomotion", Some(0.0), None);
        stack.set_animation_blend_value(&layer, "locomotion", BlendAxis::Y, 1.5, 0.0, None);
        stack.play_animation(&layer, "wave", Some(0.25), Some(EasingFn::default()));
    }
    stack
}

fn bench_stack_update(c: &mut Criterion) {
    let mut stack = build_stack(8);
    c.bench_function("stack_update_8_layers", |b| {
        b.iter(|| stack.update(black_box(16.0)));
    });

    let mut stack = build_stack(8);
    c.bench_function("update_internal_weights_8_layers", |b| {
        b.iter(|| stack.update_internal_weights());
    });
}

criterion_group!(benches, bench_stack_update);
criterion_main!(benches);
