use std::rc::Rc;

use vizij_layers_core::{
    AnimationError, AnimationEvent, BlendMode, Config, EasingFn, EntityKind, EventLog,
    LayerOptions, LayerStack, QueueState, SingleState, State, StateOptions, TimedClip,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn looping(name: &str) -> State {
    SingleState::new(name, TimedClip::looping(1.0), StateOptions::default()).into()
}

fn once(name: &str, seconds: f32) -> State {
    SingleState::new(name, TimedClip::new(seconds), StateOptions::default()).into()
}

fn stack_with_log() -> (LayerStack, Rc<EventLog>) {
    let log = Rc::new(EventLog::new(64));
    let stack = LayerStack::with_messenger(Config::default(), log.clone());
    (stack, log)
}

fn kinds(log: &EventLog) -> Vec<&'static str> {
    log.drain().iter().map(AnimationEvent::kind).collect()
}

#[test]
fn override_layer_occludes_the_layer_below() {
    let mut stack = LayerStack::default();
    stack.add_layer(
        "base",
        LayerOptions {
            blend_mode: BlendMode::Additive,
            ..LayerOptions::default()
        },
        None,
    );
    stack.add_layer("face", LayerOptions::default(), None);
    stack.add_animation("base", looping("breathe")).unwrap();
    stack.add_animation("face", looping("smile")).unwrap();
    stack.play_animation("base", "breathe", Some(0.0), None);
    stack.play_animation("face", "smile", Some(0.0), None);

    stack.update_internal_weights();

    let face = stack.layer("face").unwrap();
    approx(face.current_internal_weight().unwrap(), 1.0, 1e-6);
    assert_eq!(stack.layer("base").unwrap().internal_weight(), 0.0);
}

#[test]
fn additive_layer_does_not_occlude() {
    let mut stack = LayerStack::default();
    stack.add_layer("base", LayerOptions::default(), None);
    stack.add_layer(
        "gesture",
        LayerOptions {
            blend_mode: BlendMode::Additive,
            ..LayerOptions::default()
        },
        None,
    );
    stack.add_animation("gesture", looping("wave")).unwrap();
    stack.play_animation("gesture", "wave", Some(0.0), None);
    stack.update_internal_weights();
    assert_eq!(stack.layer("base").unwrap().internal_weight(), 1.0);
}

#[test]
fn half_weighted_override_layer_lets_half_through() {
    let mut stack = LayerStack::default();
    stack.add_layer("base", LayerOptions::default(), None);
    stack.add_layer(
        "face",
        LayerOptions {
            weight: 0.5,
            ..LayerOptions::default()
        },
        None,
    );
    stack.add_animation("face", looping("smile")).unwrap();
    stack.play_animation("face", "smile", Some(0.0), None);
    stack.update_internal_weights();
    approx(stack.layer("base").unwrap().internal_weight(), 0.5, 1e-6);
}

#[test]
fn instant_switch_zeroes_the_previous_state() {
    let mut stack = LayerStack::default();
    stack.add_layer("body", LayerOptions::default(), None);
    stack.add_animation("body", looping("x")).unwrap();
    stack.add_animation("body", looping("y")).unwrap();

    stack.play_animation("body", "x", Some(0.0), None);
    stack.play_animation("body", "y", Some(0.0), None);

    let layer = stack.layer("body").unwrap();
    assert_eq!(layer.current_state_name().as_deref(), Some("y"));
    assert_eq!(layer.state("x").unwrap().borrow().weight(), 0.0);
    assert_eq!(layer.state("y").unwrap().borrow().weight(), 1.0);
}

#[test]
fn cross_fade_promotes_the_target_when_done() {
    let mut stack = LayerStack::default();
    stack.add_layer("body", LayerOptions::default(), None);
    stack.add_animation("body", looping("idle")).unwrap();
    stack.add_animation("body", looping("walk")).unwrap();
    stack.play_animation("body", "idle", Some(0.0), None);
    stack.play_animation("body", "walk", Some(1.0), None);

    assert!(stack.layer("body").unwrap().is_transitioning());
    assert_eq!(
        stack.layer("body").unwrap().current_state_name().as_deref(),
        Some("walk")
    );

    stack.update(500.0);
    {
        let layer = stack.layer("body").unwrap();
        approx(layer.state("idle").unwrap().borrow().weight(), 0.5, 1e-5);
        approx(layer.state("walk").unwrap().borrow().weight(), 0.5, 1e-5);
    }

    stack.update(500.0);
    let layer = stack.layer("body").unwrap();
    assert!(!layer.is_transitioning());
    assert_eq!(layer.state("idle").unwrap().borrow().weight(), 0.0);
    assert_eq!(layer.state("walk").unwrap().borrow().weight(), 1.0);
    assert_eq!(layer.current_state_name().as_deref(), Some("walk"));
}

#[test]
fn finished_animation_reports_stop() {
    let (mut stack, log) = stack_with_log();
    stack.add_layer("gesture", LayerOptions::default(), None);
    stack.add_animation("gesture", once("nod", 0.5)).unwrap();
    log.drain();

    let tween = stack.play_animation("gesture", "nod", Some(0.0), None);
    stack.update(250.0);
    assert!(tween.is_pending());
    stack.update(250.0);
    assert!(tween.is_completed());
    assert_eq!(kinds(&log), vec!["play_animation", "stop_animation"]);
}

#[test]
fn replaced_animation_reports_interrupt() {
    let (mut stack, log) = stack_with_log();
    stack.add_layer("body", LayerOptions::default(), None);
    stack.add_animation("body", looping("idle")).unwrap();
    stack.add_animation("body", looping("walk")).unwrap();
    log.drain();

    let idle = stack.play_animation("body", "idle", Some(0.0), None);
    stack.play_animation("body", "walk", Some(0.0), None);
    assert!(idle.is_canceled());
    assert_eq!(
        kinds(&log),
        vec!["play_animation", "interrupt_animation", "play_animation"]
    );
}

#[test]
fn stopping_a_playing_animation_reports_stop_once() {
    let (mut stack, log) = stack_with_log();
    stack.add_layer("body", LayerOptions::default(), None);
    stack.add_animation("body", looping("idle")).unwrap();
    log.drain();

    let tween = stack.play_animation("body", "idle", Some(0.0), None);
    stack.stop_animation("body", "idle").unwrap();
    assert!(tween.is_completed());
    assert_eq!(kinds(&log), vec!["play_animation", "stop_animation"]);
}

#[test]
fn stopping_an_idle_animation_still_reports_stop() {
    let (mut stack, log) = stack_with_log();
    stack.add_layer("body", LayerOptions::default(), None);
    stack.add_animation("body", looping("idle")).unwrap();
    log.drain();

    stack.stop_animation("body", "idle").unwrap();
    assert_eq!(kinds(&log), vec!["stop_animation"]);
}

#[test]
fn pause_and_resume_reuse_the_cycle() {
    let mut stack = LayerStack::default();
    stack.add_layer("gesture", LayerOptions::default(), None);
    stack.add_animation("gesture", once("wave", 1.0)).unwrap();
    let tween = stack.play_animation("gesture", "wave", Some(0.0), None);

    stack.update(400.0);
    stack.pause_animation("gesture", "wave").unwrap();
    stack.update(1000.0);
    assert!(tween.is_pending());

    let resumed = stack.resume_animation("gesture", None, None, None);
    assert!(resumed.ptr_eq(&tween));
    stack.update(600.0);
    assert!(tween.is_completed());
}

#[test]
fn queue_advances_and_reports_each_step() {
    let (mut stack, log) = stack_with_log();
    stack.add_layer("speech", LayerOptions::default(), None);
    let queue = QueueState::new(
        "sentence",
        StateOptions::default(),
        [once("hello", 0.5), once("world", 0.5)],
    );
    stack.add_animation("speech", queue.into()).unwrap();
    log.drain();

    let tween = stack.play_animation("speech", "sentence", Some(0.0), None);
    stack.update(500.0);
    stack.update(500.0);
    assert!(tween.is_completed());

    let events = log.drain();
    let children: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            AnimationEvent::PlayNextAnimation { child, .. } => Some(child.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(children, vec!["world", "world"]);
    assert!(matches!(
        events.last(),
        Some(AnimationEvent::StopAnimation { .. })
    ));
}

#[test]
fn play_next_requires_a_queue() {
    let mut stack = LayerStack::default();
    stack.add_layer("body", LayerOptions::default(), None);
    stack.add_animation("body", looping("idle")).unwrap();
    let tween = stack.play_next_animation("body", "idle", false);
    assert!(matches!(
        tween.error(),
        Some(AnimationError::InvalidOperation { .. })
    ));
}

#[test]
fn unknown_names_fail_by_call_flavor() {
    let mut stack = LayerStack::default();
    stack.add_layer("body", LayerOptions::default(), None);

    let tween = stack.play_animation("body", "ghost", None, None);
    assert!(matches!(
        tween.error(),
        Some(AnimationError::NotFound {
            kind: EntityKind::State,
            ..
        })
    ));
    assert!(stack
        .set_layer_weight("nowhere", 1.0, 0.0, None)
        .is_rejected());
    assert_eq!(
        stack.remove_layer("nowhere"),
        Err(AnimationError::not_found(EntityKind::Layer, "nowhere"))
    );
    assert!(stack.rename_animation("body", "ghost", "spirit").is_err());
}

#[test]
fn duplicate_names_are_incremented() {
    let mut stack = LayerStack::default();
    assert_eq!(stack.add_layer("face", LayerOptions::default(), None), "face");
    assert_eq!(stack.add_layer("face", LayerOptions::default(), None), "face1");
    assert_eq!(stack.add_animation("face", looping("blink")).unwrap(), "blink");
    assert_eq!(stack.add_animation("face", looping("blink")).unwrap(), "blink1");
}

#[test]
fn out_of_range_indices_are_clamped() {
    let mut stack = LayerStack::default();
    stack.add_layer("a", LayerOptions::default(), None);
    stack.add_layer("b", LayerOptions::default(), Some(99));
    stack.add_layer("c", LayerOptions::default(), Some(0));
    assert_eq!(stack.layer_names(), vec!["c", "a", "b"]);

    stack.move_layer("c", 42).unwrap();
    assert_eq!(stack.layer_names(), vec!["a", "b", "c"]);
}

#[test]
fn renames_keep_position() {
    let mut stack = LayerStack::default();
    stack.add_layer("a", LayerOptions::default(), None);
    stack.add_layer("b", LayerOptions::default(), None);
    stack.add_layer("c", LayerOptions::default(), None);
    assert_eq!(stack.rename_layer("b", "c").unwrap(), "c1");
    assert_eq!(stack.layer_names(), vec!["a", "c1", "c"]);
    assert_eq!(stack.layer("c1").unwrap().name(), "c1");
}

#[test]
fn layer_weight_tween_runs_with_the_stack() {
    let mut stack = LayerStack::default();
    stack.add_layer("face", LayerOptions::default(), None);
    let tween = stack.set_layer_weight("face", 0.0, 0.5, Some(EasingFn::default()));
    stack.update(250.0);
    approx(stack.layer_weight("face").unwrap(), 0.5, 1e-5);
    stack.update(250.0);
    assert!(tween.is_completed());
    assert_eq!(stack.layer_weight("face").unwrap(), 0.0);
}

#[test]
fn remove_layer_discards_its_states() {
    let (mut stack, log) = stack_with_log();
    stack.add_layer("face", LayerOptions::default(), None);
    stack.add_animation("face", looping("smile")).unwrap();
    let tween = stack.play_animation("face", "smile", Some(0.0), None);
    stack.remove_layer("face").unwrap();
    assert!(tween.is_canceled());
    assert!(stack.is_empty());
    assert_eq!(kinds(&log).last(), Some(&"remove_layer"));
}
