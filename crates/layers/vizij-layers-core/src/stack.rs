//! Ordered stack of layers and the per-frame weight composition.
//!
//! Layers are kept bottom to top. Every tick the stack first sweeps the layers
//! top to bottom handing each one a weight multiplier: an Override layer whose
//! current state is active hides the layers below it by that state's internal
//! weight, an Additive layer leaves the multiplier untouched. Only after every
//! internal weight is written do states step their tweens and clips.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::{AnimationError, EntityKind};
use crate::events::{AnimationEvent, Messenger, NullMessenger};
use crate::interp::EasingFn;
use crate::layer::{BlendMode, Layer, LayerOptions};
use crate::names::unique_name;
use crate::state::{BlendAxis, QueueAdvance, SharedState, State};
use crate::tween::Tween;
use crate::Result;

pub struct LayerStack {
    config: Config,
    layers: IndexMap<String, Layer>,
    messenger: Rc<dyn Messenger>,
}

impl std::fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStack")
            .field("config", &self.config)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl LayerStack {
    /// Stack that drops its events.
    pub fn new(config: Config) -> Self {
        Self::with_messenger(config, Rc::new(NullMessenger))
    }

    pub fn with_messenger(config: Config, messenger: Rc<dyn Messenger>) -> Self {
        Self {
            config,
            layers: IndexMap::new(),
            messenger,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Layer options seeded from the stack configuration.
    pub fn layer_options(&self) -> LayerOptions {
        LayerOptions {
            transition_seconds: self.config.transition_seconds,
            easing: self.config.easing,
            ..LayerOptions::default()
        }
    }

    fn default_easing(&self, easing: Option<EasingFn>) -> EasingFn {
        easing.unwrap_or_else(|| self.config.easing.into())
    }

    fn emit(&self, event: AnimationEvent) {
        self.messenger.emit(event);
    }

    // ---- layers ----

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names, bottom to top.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.keys().cloned().collect()
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(name)
    }

    fn require_layer(&self, name: &str) -> Result<&Layer> {
        self.layers
            .get(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Layer, name))
    }

    fn require_layer_mut(&mut self, name: &str) -> Result<&mut Layer> {
        self.layers
            .get_mut(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Layer, name))
    }

    fn clamp_index(&self, index: usize, max: usize) -> usize {
        if index > max {
            log::warn!("Layer index {index} is out of range, clamped to {max}");
            max
        } else {
            index
        }
    }

    /// Insert a layer at `index` (top of the stack when `None`). Returns the final
    /// name, which differs from `name` when it was already taken.
    pub fn add_layer(&mut self, name: &str, options: LayerOptions, index: Option<usize>) -> String {
        let unique = unique_name(name, |candidate| self.layers.contains_key(candidate));
        if unique != name {
            log::warn!("Layer name {name:?} is already in use, renamed to {unique:?}");
        }
        let top = self.layers.len();
        let index = self.clamp_index(index.unwrap_or(top), top);

        self.layers.insert(unique.clone(), Layer::new(&unique, options));
        self.layers.move_index(top, index);
        log::debug!("Added layer {unique:?} at index {index}");
        self.emit(AnimationEvent::AddLayer {
            layer: unique.clone(),
            index,
        });
        unique
    }

    pub fn remove_layer(&mut self, name: &str) -> Result<()> {
        let mut layer = self
            .layers
            .shift_remove(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Layer, name))?;
        layer.discard();
        self.emit(AnimationEvent::RemoveLayer {
            layer: name.to_string(),
        });
        Ok(())
    }

    /// Move a layer to `index`, clamped to the stack.
    pub fn move_layer(&mut self, name: &str, index: usize) -> Result<()> {
        let from = self
            .layers
            .get_index_of(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Layer, name))?;
        let to = self.clamp_index(index, self.layers.len() - 1);
        self.layers.move_index(from, to);
        Ok(())
    }

    pub fn rename_layer(&mut self, current: &str, new_name: &str) -> Result<String> {
        let index = self
            .layers
            .get_index_of(current)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Layer, current))?;
        if current == new_name {
            return Ok(new_name.to_string());
        }
        let unique = unique_name(new_name, |candidate| self.layers.contains_key(candidate));
        if unique != new_name {
            log::warn!("Layer name {new_name:?} is already in use, renamed to {unique:?}");
        }

        let (_, mut layer) = self
            .layers
            .shift_remove_index(index)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Layer, current))?;
        layer.set_name(&unique);
        self.layers.insert(unique.clone(), layer);
        let last = self.layers.len() - 1;
        self.layers.move_index(last, index);

        if let Some(layer) = self.layers.get(&unique) {
            for (animation, state) in layer.states().iter() {
                self.bind_queue_events(&unique, animation, state);
            }
        }
        self.emit(AnimationEvent::RenameLayer {
            old_name: current.to_string(),
            new_name: unique.clone(),
        });
        Ok(unique)
    }

    pub fn layer_weight(&self, layer: &str) -> Result<f32> {
        self.require_layer(layer).map(Layer::weight)
    }

    pub fn set_layer_weight(
        &mut self,
        layer: &str,
        weight: f32,
        seconds: f32,
        easing: Option<EasingFn>,
    ) -> Tween {
        let easing = self.default_easing(easing);
        match self.require_layer_mut(layer) {
            Ok(layer) => layer.set_weight(weight, seconds, easing),
            Err(err) => Tween::rejected(err),
        }
    }

    // ---- animations ----

    /// Forward queue advances of `state` to the messenger.
    fn bind_queue_events(&self, layer: &str, animation: &str, state: &SharedState) {
        let mut state = state.borrow_mut();
        let Some(queue) = state.as_queue_mut() else {
            return;
        };
        let messenger = self.messenger.clone();
        let layer = layer.to_string();
        let animation = animation.to_string();
        queue.set_on_next(Some(Box::new(move |advance: &QueueAdvance| {
            messenger.emit(AnimationEvent::PlayNextAnimation {
                layer: layer.clone(),
                animation: animation.clone(),
                child: advance.name.clone(),
                can_advance: advance.can_advance,
                is_queue_end: advance.is_queue_end,
            });
        })));
    }

    pub fn add_animation(&mut self, layer: &str, state: State) -> Result<String> {
        let target = self.require_layer_mut(layer)?;
        let name = target.add_state(state);
        if let Some(shared) = target.state(&name) {
            self.bind_queue_events(layer, &name, &shared);
        }
        self.emit(AnimationEvent::AddAnimation {
            layer: layer.to_string(),
            animation: name.clone(),
        });
        Ok(name)
    }

    pub fn remove_animation(&mut self, layer: &str, name: &str) -> Result<()> {
        self.require_layer_mut(layer)?.remove_state(name)?;
        self.emit(AnimationEvent::RemoveAnimation {
            layer: layer.to_string(),
            animation: name.to_string(),
        });
        Ok(())
    }

    pub fn rename_animation(&mut self, layer: &str, current: &str, new_name: &str) -> Result<String> {
        let target = self.require_layer_mut(layer)?;
        let name = target.rename_state(current, new_name)?;
        if let Some(shared) = target.state(&name) {
            self.bind_queue_events(layer, &name, &shared);
        }
        self.emit(AnimationEvent::RenameAnimation {
            layer: layer.to_string(),
            old_name: current.to_string(),
            new_name: name.clone(),
        });
        Ok(name)
    }

    pub fn animation_names(&self, layer: &str) -> Result<Vec<String>> {
        self.require_layer(layer).map(Layer::state_names)
    }

    fn require_animation(&self, layer: &str, name: &str) -> Result<SharedState> {
        self.require_layer(layer)?
            .state(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::Animation, name))
    }

    pub fn animation_weight(&self, layer: &str, name: &str) -> Result<f32> {
        let state = self.require_animation(layer, name)?;
        let weight = state.borrow().weight();
        Ok(weight)
    }

    pub fn set_animation_weight(
        &mut self,
        layer: &str,
        name: &str,
        weight: f32,
        seconds: f32,
        easing: Option<EasingFn>,
    ) -> Tween {
        let easing = self.default_easing(easing);
        match self.require_animation(layer, name) {
            Ok(state) => {
                let tween = state.borrow_mut().set_weight(weight, seconds, easing);
                tween
            }
            Err(err) => Tween::rejected(err),
        }
    }

    /// Authored weight of `child` inside the free blend `name`.
    pub fn animation_blend_weight(&self, layer: &str, name: &str, child: &str) -> Result<f32> {
        let state = self.require_animation(layer, name)?;
        let state = state.borrow();
        match state.as_free_blend() {
            Some(blend) => blend.blend_weight(child),
            None => Err(not_a(name, "free blend")),
        }
    }

    pub fn set_animation_blend_weight(
        &mut self,
        layer: &str,
        name: &str,
        child: &str,
        weight: f32,
        seconds: f32,
        easing: Option<EasingFn>,
    ) -> Tween {
        let easing = self.default_easing(easing);
        let state = match self.require_animation(layer, name) {
            Ok(state) => state,
            Err(err) => return Tween::rejected(err),
        };
        let mut state = state.borrow_mut();
        match state.as_free_blend_mut() {
            Some(blend) => blend.set_blend_weight(child, weight, seconds, easing),
            None => Tween::rejected(not_a(name, "free blend")),
        }
    }

    /// Blend coordinate of the 2D blend tree `name` along `axis`.
    pub fn animation_blend_value(&self, layer: &str, name: &str, axis: BlendAxis) -> Result<f32> {
        let state = self.require_animation(layer, name)?;
        let state = state.borrow();
        match state.as_blend2d() {
            Some(blend) => Ok(blend.blend_value(axis)),
            None => Err(not_a(name, "2D blend tree")),
        }
    }

    pub fn set_animation_blend_value(
        &mut self,
        layer: &str,
        name: &str,
        axis: BlendAxis,
        value: f32,
        seconds: f32,
        easing: Option<EasingFn>,
    ) -> Tween {
        let easing = self.default_easing(easing);
        let state = match self.require_animation(layer, name) {
            Ok(state) => state,
            Err(err) => return Tween::rejected(err),
        };
        let mut state = state.borrow_mut();
        match state.as_blend2d_mut() {
            Some(blend) => blend.set_blend_value(axis, value, seconds, easing),
            None => Tween::rejected(not_a(name, "2D blend tree")),
        }
    }

    // ---- playback ----

    /// Play `name` on `layer`. The returned tween resolves when the animation
    /// finishes and is canceled when another animation interrupts it.
    pub fn play_animation(
        &mut self,
        layer: &str,
        name: &str,
        seconds: Option<f32>,
        easing: Option<EasingFn>,
    ) -> Tween {
        let target = match self.require_layer_mut(layer) {
            Ok(target) => target,
            Err(err) => {
                log::warn!("Cannot play {name:?}: {err}");
                return Tween::rejected(err);
            }
        };
        let seconds = seconds.unwrap_or(target.transition_seconds());
        let tween = target.play_animation(name, Some(seconds), easing);
        if tween.is_rejected() {
            return tween;
        }

        self.emit(AnimationEvent::PlayAnimation {
            layer: layer.to_string(),
            animation: name.to_string(),
            transition_seconds: seconds,
        });
        self.report_completion(&tween, layer, name);
        tween
    }

    /// Emit a stop event when `tween` resolves and an interrupt event when it is
    /// canceled.
    fn report_completion(&self, tween: &Tween, layer: &str, name: &str) {
        let messenger = self.messenger.clone();
        let (l, n) = (layer.to_string(), name.to_string());
        tween.on_resolve(move || {
            messenger.emit(AnimationEvent::StopAnimation {
                layer: l,
                animation: n,
            });
        });
        let messenger = self.messenger.clone();
        let (l, n) = (layer.to_string(), name.to_string());
        tween.on_cancel(move || {
            messenger.emit(AnimationEvent::InterruptAnimation {
                layer: l,
                animation: n,
            });
        });
    }

    /// Advance the queue `name` on `layer`.
    pub fn play_next_animation(&mut self, layer: &str, name: &str, wrap: bool) -> Tween {
        match self.require_layer_mut(layer) {
            Ok(target) => target.play_next_animation(name, wrap),
            Err(err) => Tween::rejected(err),
        }
    }

    pub fn pause_animation(&mut self, layer: &str, name: &str) -> Result<()> {
        self.require_layer_mut(layer)?.pause_animation(name)?;
        self.emit(AnimationEvent::PauseAnimation {
            layer: layer.to_string(),
            animation: name.to_string(),
        });
        Ok(())
    }

    /// Resume `name` (the layer's current animation when `None`). An animation
    /// that is not current is played instead.
    pub fn resume_animation(
        &mut self,
        layer: &str,
        name: Option<&str>,
        seconds: Option<f32>,
        easing: Option<EasingFn>,
    ) -> Tween {
        let target = match self.require_layer_mut(layer) {
            Ok(target) => target,
            Err(err) => return Tween::rejected(err),
        };
        let resolved = match name.map(str::to_string).or_else(|| target.current_state_name()) {
            Some(resolved) => resolved,
            None => {
                return Tween::rejected(AnimationError::invalid_operation(format!(
                    "layer {layer:?} has no current animation to resume"
                )))
            }
        };
        if target.current_state_name().as_deref() != Some(resolved.as_str()) {
            return self.play_animation(layer, &resolved, seconds, easing);
        }

        let tween = target.resume_animation(Some(&resolved), seconds, easing);
        if !tween.is_rejected() {
            self.emit(AnimationEvent::ResumeAnimation {
                layer: layer.to_string(),
                animation: resolved,
            });
        }
        tween
    }

    /// Stop `name` on `layer` and report `StopAnimation` once. A running cycle
    /// started by [`play_animation`](Self::play_animation) reports it through
    /// its finish tween.
    pub fn stop_animation(&mut self, layer: &str, name: &str) -> Result<()> {
        let running = self.require_layer_mut(layer)?.stop_animation(name)?;
        if !running {
            self.emit(AnimationEvent::StopAnimation {
                layer: layer.to_string(),
                animation: name.to_string(),
            });
        }
        Ok(())
    }

    // ---- ticking ----

    /// Top to bottom sweep writing every layer's internal weight.
    pub fn update_internal_weights(&mut self) {
        let mut multiplier = 1.0_f32;
        for layer in self.layers.values_mut().rev() {
            layer.update_internal_weight(multiplier);
            if layer.blend_mode() == BlendMode::Override {
                if let Some(current) = layer.current_internal_weight() {
                    multiplier *= 1.0 - current;
                }
            }
        }
    }

    /// Advance every layer by `delta_ms` milliseconds.
    pub fn update(&mut self, delta_ms: f32) {
        self.update_internal_weights();
        for layer in self.layers.values_mut() {
            layer.update(delta_ms);
        }
    }

    /// Discard every layer.
    pub fn discard(&mut self) {
        for layer in self.layers.values_mut() {
            layer.discard();
        }
        self.layers.clear();
    }
}

fn not_a(name: &str, kind: &str) -> AnimationError {
    AnimationError::invalid_operation(format!("animation {name:?} is not a {kind}"))
}
