//! Keyed, insertion-ordered collection of child states.
//!
//! Owned by every container state and by layers. Names are unique within one
//! container; collisions are resolved by [`unique_name`] with a warning.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{AnimationError, EntityKind};
use crate::names::unique_name;
use crate::state::{SharedState, State};
use crate::tween::Tween;
use crate::Result;

#[derive(Debug, Default)]
pub struct StateContainer {
    states: IndexMap<String, SharedState>,
}

impl StateContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_states(states: impl IntoIterator<Item = State>) -> Self {
        let mut container = Self::new();
        for state in states {
            container.add(state);
        }
        container
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SharedState> {
        self.states.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&SharedState> {
        self.states.get_index(index).map(|(_, state)| state)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.states.get_index_of(name)
    }

    /// Look up `name`, failing with [`AnimationError::NotFound`].
    pub fn require(&self, name: &str) -> Result<&SharedState> {
        self.states
            .get(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::State, name))
    }

    pub fn names(&self) -> Vec<String> {
        self.states.keys().cloned().collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &SharedState> {
        self.states.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SharedState)> {
        self.states.iter()
    }

    /// Add a state, renaming it when its name is taken. Returns the final name.
    pub fn add(&mut self, state: State) -> String {
        let requested = state.name().to_string();
        let name = unique_name(&requested, |candidate| self.states.contains_key(candidate));
        if name != requested {
            log::warn!("State name {requested:?} is already in use, renamed to {name:?}");
        }
        let shared = state.into_shared();
        shared.borrow_mut().set_name(&name);
        self.states.insert(name.clone(), shared);
        name
    }

    /// Remove and discard a state.
    pub fn remove(&mut self, name: &str) -> Result<SharedState> {
        let state = self
            .states
            .shift_remove(name)
            .ok_or_else(|| AnimationError::not_found(EntityKind::State, name))?;
        state.borrow_mut().discard();
        Ok(state)
    }

    /// Rename a state in place, keeping its position. Returns the final name.
    pub fn rename(&mut self, current: &str, new_name: &str) -> Result<String> {
        let index = self
            .states
            .get_index_of(current)
            .ok_or_else(|| AnimationError::not_found(EntityKind::State, current))?;
        if current == new_name {
            return Ok(new_name.to_string());
        }

        let name = unique_name(new_name, |candidate| self.states.contains_key(candidate));
        if name != new_name {
            log::warn!("State name {new_name:?} is already in use, renamed to {name:?}");
        }
        let (_, state) = self
            .states
            .shift_remove_index(index)
            .ok_or_else(|| AnimationError::not_found(EntityKind::State, current))?;
        state.borrow_mut().set_name(&name);
        self.states.insert(name.clone(), state);
        let last = self.states.len() - 1;
        self.states.move_index(last, index);
        Ok(name)
    }

    /// True if `state` is one of the states held here.
    pub fn holds(&self, state: &SharedState) -> bool {
        self.states.values().any(|s| Rc::ptr_eq(s, state))
    }

    pub fn play_all(&self) -> Vec<Tween> {
        self.states.values().map(|s| s.borrow_mut().play()).collect()
    }

    pub fn pause_all(&self) {
        for state in self.states.values() {
            state.borrow_mut().pause();
        }
    }

    pub fn resume_all(&self) -> Vec<Tween> {
        self.states.values().map(|s| s.borrow_mut().resume()).collect()
    }

    pub fn cancel_all(&self) {
        for state in self.states.values() {
            state.borrow_mut().cancel();
        }
    }

    pub fn stop_all(&self) {
        for state in self.states.values() {
            state.borrow_mut().stop();
        }
    }

    pub fn deactivate_all(&self) {
        for state in self.states.values() {
            state.borrow_mut().deactivate();
        }
    }

    pub fn update_all(&self, delta_ms: f32) {
        for state in self.states.values() {
            state.borrow_mut().update(delta_ms);
        }
    }

    /// Discard every state and empty the container.
    pub fn discard(&mut self) {
        for state in self.states.values() {
            state.borrow_mut().discard();
        }
        self.states.clear();
    }
}
