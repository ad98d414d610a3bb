//! Tween: a cancellable, resumable unit of deferred work stepped by delta time.
//!
//! A tween never runs on its own. Whoever owns it calls [`Tween::execute`] once per
//! tick with the elapsed milliseconds; the step function decides whether the tween
//! keeps going, resolves or rejects. Any clone of the handle can settle it, which
//! gives every in-flight interpolation a single cancel point reachable from
//! anywhere in the graph.
//!
//! Status transitions are monotonic: once a tween leaves `Pending` it never changes
//! again and further `resolve`/`reject`/`cancel` calls are no-ops. Cancellation is
//! a resolution variant, so [`Tween::is_resolved`] is true for canceled tweens.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::AnimationError;

/// Terminal or pending status of a tween.
#[derive(Debug, Clone, PartialEq)]
pub enum TweenStatus {
    Pending,
    Resolved,
    Rejected(AnimationError),
    Canceled,
}

impl TweenStatus {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Rejected(_) => "rejected",
            Self::Canceled => "canceled",
        }
    }
}

/// Outcome of one call to a tween's step function.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Pending,
    Resolve,
    Reject(AnimationError),
}

type StepFn = Box<dyn FnMut(f32) -> Step>;
type Callback = Box<dyn FnOnce()>;
type ErrorCallback = Box<dyn FnOnce(&AnimationError)>;
type SettleCallback = Box<dyn FnOnce(&TweenStatus)>;

#[derive(Default)]
struct Callbacks {
    on_resolve: Vec<Callback>,
    on_reject: Vec<ErrorCallback>,
    on_cancel: Vec<Callback>,
    on_settle: Vec<SettleCallback>,
}

impl Callbacks {
    fn fire(self, status: &TweenStatus) {
        match status {
            TweenStatus::Resolved => self.on_resolve.into_iter().for_each(|cb| cb()),
            TweenStatus::Canceled => self.on_cancel.into_iter().for_each(|cb| cb()),
            TweenStatus::Rejected(err) => self.on_reject.into_iter().for_each(|cb| cb(err)),
            TweenStatus::Pending => return,
        }
        for cb in self.on_settle {
            cb(status);
        }
    }
}

struct Inner {
    status: TweenStatus,
    step: Option<StepFn>,
    callbacks: Callbacks,
    /// Tweens that follow this one down when it resolves or cancels (`Tween::all`).
    children: Vec<Tween>,
}

/// Shared handle to a tween. Cloning shares the same underlying state.
#[derive(Clone)]
pub struct Tween {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("status", &self.inner.borrow().status)
            .finish()
    }
}

impl Default for Tween {
    fn default() -> Self {
        Self::resolved()
    }
}

impl Tween {
    fn with_status(status: TweenStatus, step: Option<StepFn>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                status,
                step,
                callbacks: Callbacks::default(),
                children: Vec::new(),
            })),
        }
    }

    /// Create a pending tween driven by `step`, which receives the delta time of
    /// each [`execute`](Self::execute) call.
    pub fn new(step: impl FnMut(f32) -> Step + 'static) -> Self {
        Self::with_status(TweenStatus::Pending, Some(Box::new(step)))
    }

    /// Pending tween without a step function; it is settled externally.
    pub fn pending() -> Self {
        Self::with_status(TweenStatus::Pending, None)
    }

    pub fn resolved() -> Self {
        Self::with_status(TweenStatus::Resolved, None)
    }

    pub fn rejected(error: AnimationError) -> Self {
        Self::with_status(TweenStatus::Rejected(error), None)
    }

    pub fn canceled() -> Self {
        Self::with_status(TweenStatus::Canceled, None)
    }

    pub fn status(&self) -> TweenStatus {
        self.inner.borrow().status.clone()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().status, TweenStatus::Pending)
    }

    /// True once resolved, including by cancellation.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(
            self.inner.borrow().status,
            TweenStatus::Resolved | TweenStatus::Canceled
        )
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self.inner.borrow().status, TweenStatus::Rejected(_))
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        matches!(self.inner.borrow().status, TweenStatus::Canceled)
    }

    /// Resolved normally, not by cancellation.
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self.inner.borrow().status, TweenStatus::Resolved)
    }

    pub fn error(&self) -> Option<AnimationError> {
        match &self.inner.borrow().status {
            TweenStatus::Rejected(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// True when both handles point at the same tween.
    #[inline]
    pub fn ptr_eq(&self, other: &Tween) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Resolve the tween. Returns false if it was already settled.
    pub fn resolve(&self) -> bool {
        self.settle(TweenStatus::Resolved)
    }

    /// Reject the tween. Returns false if it was already settled.
    pub fn reject(&self, error: AnimationError) -> bool {
        self.settle(TweenStatus::Rejected(error))
    }

    /// Cancel the tween. Returns false if it was already settled.
    pub fn cancel(&self) -> bool {
        self.settle(TweenStatus::Canceled)
    }

    fn settle(&self, status: TweenStatus) -> bool {
        let (callbacks, children) = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.status, TweenStatus::Pending) {
                return false;
            }
            inner.status = status.clone();
            inner.step = None;
            (
                std::mem::take(&mut inner.callbacks),
                std::mem::take(&mut inner.children),
            )
        };

        match status {
            TweenStatus::Resolved => children.iter().for_each(|child| {
                child.resolve();
            }),
            TweenStatus::Canceled => children.iter().for_each(|child| {
                child.cancel();
            }),
            _ => {}
        }

        callbacks.fire(&status);
        true
    }

    /// Run the step function once with `delta_ms`. No-op unless pending.
    pub fn execute(&self, delta_ms: f32) {
        let mut step = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.status, TweenStatus::Pending) {
                return;
            }
            match inner.step.take() {
                Some(step) => step,
                None => return,
            }
        };

        match step(delta_ms) {
            Step::Pending => {
                let mut inner = self.inner.borrow_mut();
                // The step may have settled this tween through a callback.
                if matches!(inner.status, TweenStatus::Pending) {
                    inner.step = Some(step);
                }
            }
            Step::Resolve => {
                self.resolve();
            }
            Step::Reject(err) => {
                self.reject(err);
            }
        }
    }

    /// Called on normal resolution. Fires immediately if already resolved.
    pub fn on_resolve(&self, callback: impl FnOnce() + 'static) -> &Self {
        let status = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.status, TweenStatus::Pending) {
                inner.callbacks.on_resolve.push(Box::new(callback));
                return self;
            }
            inner.status.clone()
        };
        if status == TweenStatus::Resolved {
            callback();
        }
        self
    }

    /// Called on rejection. Fires immediately if already rejected.
    pub fn on_reject(&self, callback: impl FnOnce(&AnimationError) + 'static) -> &Self {
        let status = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.status, TweenStatus::Pending) {
                inner.callbacks.on_reject.push(Box::new(callback));
                return self;
            }
            inner.status.clone()
        };
        if let TweenStatus::Rejected(err) = &status {
            callback(err);
        }
        self
    }

    /// Called on cancellation. Fires immediately if already canceled.
    pub fn on_cancel(&self, callback: impl FnOnce() + 'static) -> &Self {
        let status = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.status, TweenStatus::Pending) {
                inner.callbacks.on_cancel.push(Box::new(callback));
                return self;
            }
            inner.status.clone()
        };
        if status == TweenStatus::Canceled {
            callback();
        }
        self
    }

    /// Called with the terminal status, whatever it is.
    pub fn on_settle(&self, callback: impl FnOnce(&TweenStatus) + 'static) -> &Self {
        let status = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.status, TweenStatus::Pending) {
                inner.callbacks.on_settle.push(Box::new(callback));
                return self;
            }
            inner.status.clone()
        };
        callback(&status);
        self
    }

    /// A tween that settles the same way as `self`, without settling `self` back
    /// when it is resolved or canceled on its own.
    pub fn follow(&self) -> Tween {
        let follower = Tween::pending();
        let weak = Rc::downgrade(&follower.inner);
        self.on_settle(move |status| {
            if let Some(inner) = weak.upgrade() {
                Tween { inner }.settle(status.clone());
            }
        });
        follower
    }

    /// Combine tweens into one that resolves when every child resolved, rejects as
    /// soon as one child rejects and cancels as soon as one child cancels.
    ///
    /// Resolving or canceling the combined tween resolves or cancels every child
    /// that is still pending. An empty set resolves immediately.
    pub fn all(tweens: impl IntoIterator<Item = Tween>) -> Tween {
        let children: Vec<Tween> = tweens.into_iter().collect();
        let combined = Tween::pending();
        if children.is_empty() {
            combined.resolve();
            return combined;
        }

        combined.inner.borrow_mut().children = children.clone();
        for child in &children {
            let weak: Weak<RefCell<Inner>> = Rc::downgrade(&combined.inner);
            child.on_settle(move |status| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let combined = Tween { inner };
                match status {
                    TweenStatus::Resolved => {
                        let finished = combined
                            .inner
                            .borrow()
                            .children
                            .iter()
                            .all(Tween::is_completed);
                        if finished {
                            combined.resolve();
                        }
                    }
                    TweenStatus::Canceled => {
                        combined.cancel();
                    }
                    TweenStatus::Rejected(err) => {
                        combined.reject(err.clone());
                    }
                    TweenStatus::Pending => {}
                }
            });
        }
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn cancel_is_idempotent_and_counts_as_resolution() {
        let tween = Tween::pending();
        let (canceled, on_cancel) = counter();
        tween.on_cancel(on_cancel);

        assert!(tween.cancel());
        assert!(!tween.cancel());
        assert!(tween.is_resolved());
        assert!(tween.is_canceled());
        assert!(!tween.is_completed());
        assert_eq!(canceled.get(), 1);
    }

    #[test]
    fn normal_resolution_is_not_canceled() {
        let tween = Tween::pending();
        tween.resolve();
        assert!(tween.is_resolved());
        assert!(!tween.is_canceled());
        assert!(!tween.reject(AnimationError::validation("late")));
        assert_eq!(tween.status(), TweenStatus::Resolved);
    }

    #[test]
    fn execute_runs_only_while_pending() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let tween = Tween::new(move |_| {
            c.set(c.get() + 1);
            if c.get() == 2 {
                Step::Resolve
            } else {
                Step::Pending
            }
        });
        tween.execute(16.0);
        tween.execute(16.0);
        tween.execute(16.0);
        assert_eq!(calls.get(), 2);
        assert!(tween.is_completed());
    }

    #[test]
    fn callbacks_on_settled_tween_fire_immediately() {
        let tween = Tween::rejected(AnimationError::validation("bad"));
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        tween.on_reject(move |err| *s.borrow_mut() = Some(err.clone()));
        assert_eq!(*seen.borrow(), Some(AnimationError::validation("bad")));
    }

    #[test]
    fn all_resolves_after_every_child() {
        let a = Tween::pending();
        let b = Tween::pending();
        let combined = Tween::all([a.clone(), b.clone()]);
        a.resolve();
        assert!(combined.is_pending());
        b.resolve();
        assert!(combined.is_completed());
    }

    #[test]
    fn all_cancels_when_a_child_cancels_and_propagates_down() {
        let a = Tween::pending();
        let b = Tween::pending();
        let combined = Tween::all([a.clone(), b.clone()]);
        a.cancel();
        assert!(combined.is_canceled());
        assert!(b.is_canceled());
    }

    #[test]
    fn all_resolution_resolves_children() {
        let a = Tween::pending();
        let b = Tween::resolved();
        let combined = Tween::all([a.clone(), b]);
        combined.resolve();
        assert!(a.is_completed());
    }

    #[test]
    fn all_rejects_with_child_error() {
        let a = Tween::pending();
        let combined = Tween::all([a.clone(), Tween::pending()]);
        a.reject(AnimationError::validation("nan"));
        assert_eq!(combined.error(), Some(AnimationError::validation("nan")));
    }

    #[test]
    fn empty_all_resolves_immediately() {
        assert!(Tween::all(Vec::new()).is_completed());
    }

    #[test]
    fn follower_does_not_settle_its_source() {
        let source = Tween::pending();
        let follower = source.follow();
        follower.cancel();
        assert!(source.is_pending());

        let follower = source.follow();
        source.resolve();
        assert!(follower.is_completed());
    }
}
