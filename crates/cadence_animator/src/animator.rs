//! Animator state machine
//!
//! An [`Animator`] owns one [`Animation`] value and one clock
//! subscription, and drives the animation through its lifecycle:
//!
//! ```text
//! Pending ──start──▶ Running ◀─resume/pause─▶ Paused
//!    │                  │                        │
//!    └──────────────────┴───cancel / finish──────┘
//!                           ▼
//!                 Completed(Cancelled | Finished)
//! ```
//!
//! `Completed` is terminal and reached exactly once; the clock
//! subscription is released on entry. Commands issued outside their valid
//! source state are no-ops rather than errors, because UI callers rarely
//! track the current state precisely. The per-frame path is strictly
//! advance, then `changed`, then the finish check.
//!
//! Event observers receive a snapshot of the animation value, so an
//! observer may synchronously issue commands on the owning animator
//! (e.g. cancel from a `changed` observer) without re-entrancy hazards.

use crate::animation::Animation;
use crate::events::EventSource;
use cadence_clock::{FrameClock, Subscription};
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

/// Terminal outcome of a completed animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Cancelled,
    Finished,
}

/// Lifecycle state of an [`Animator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// Constructed, not yet started.
    Pending,
    /// Subscribed to the clock and advancing each frame.
    Running,
    /// Started but currently detached from the frame feed.
    Paused,
    /// Terminal; no further transition occurs.
    Completed(Completion),
}

impl AnimatorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnimatorState::Completed(_))
    }
}

/// Transitions outside this table are contract violations: fatal in debug
/// builds, logged and ignored in release builds.
fn transition_is_legal(from: AnimatorState, to: AnimatorState) -> bool {
    use AnimatorState::*;
    match (from, to) {
        (Completed(_), _) => false,
        (_, Pending) => false,
        (Pending, Running) => true,
        (Running, Paused) => true,
        (Paused, Running) => true,
        (_, Completed(_)) => true,
        _ => false,
    }
}

/// The six lifecycle broadcast points of an animator.
///
/// Each delivers a snapshot of the animation value to every observer,
/// synchronously, in registration order.
pub struct AnimatorEvents<A> {
    pub started: EventSource<A>,
    pub paused: EventSource<A>,
    pub resumed: EventSource<A>,
    pub changed: EventSource<A>,
    pub cancelled: EventSource<A>,
    pub finished: EventSource<A>,
}

impl<A> AnimatorEvents<A> {
    fn new() -> Self {
        Self {
            started: EventSource::new(),
            paused: EventSource::new(),
            resumed: EventSource::new(),
            changed: EventSource::new(),
            cancelled: EventSource::new(),
            finished: EventSource::new(),
        }
    }
}

struct AnimatorCore<A> {
    state: AnimatorState,
    animation: A,
    subscription: Option<Subscription>,
}

struct AnimatorShared<A> {
    core: RefCell<AnimatorCore<A>>,
    events: AnimatorEvents<A>,
}

impl<A: Animation + Clone> AnimatorShared<A> {
    fn state(&self) -> AnimatorState {
        self.core.borrow().state
    }

    fn snapshot(&self) -> A {
        self.core.borrow().animation.clone()
    }

    fn transition(&self, next: AnimatorState) -> bool {
        let mut core = self.core.borrow_mut();
        if !transition_is_legal(core.state, next) {
            debug_assert!(
                false,
                "illegal animator transition: {:?} -> {:?}",
                core.state, next
            );
            tracing::warn!(from = ?core.state, to = ?next, "ignoring illegal animator transition");
            return false;
        }
        tracing::debug!(from = ?core.state, to = ?next, "animator transition");
        core.state = next;
        true
    }

    fn start(&self) {
        if self.state() != AnimatorState::Pending {
            return;
        }
        self.transition(AnimatorState::Running);
        self.events.started.emit(&self.snapshot());
        self.enter_running();
    }

    fn pause(&self) {
        if self.state() != AnimatorState::Running {
            return;
        }
        self.transition(AnimatorState::Paused);
        self.events.paused.emit(&self.snapshot());
        if self.state() != AnimatorState::Paused {
            return;
        }
        // The finished flag can flip outside the tick path (shared
        // animation handles); re-check before detaching.
        if self.core.borrow().animation.is_finished() {
            self.complete(Completion::Finished);
            return;
        }
        if let Some(subscription) = self.core.borrow().subscription.as_ref() {
            subscription.set_paused(true);
        }
    }

    fn resume(&self) {
        if self.state() != AnimatorState::Paused {
            return;
        }
        self.transition(AnimatorState::Running);
        self.events.resumed.emit(&self.snapshot());
        self.enter_running();
    }

    fn cancel(&self) {
        if self.state().is_terminal() {
            return;
        }
        self.complete(Completion::Cancelled);
    }

    /// Entry into `Running` (from `start` or `resume`): an animation that
    /// is already finished completes before any tick; otherwise the clock
    /// feed is activated. An observer of the event just fired may have
    /// cancelled, hence the state check.
    fn enter_running(&self) {
        if self.state() != AnimatorState::Running {
            return;
        }
        if self.core.borrow().animation.is_finished() {
            self.complete(Completion::Finished);
            return;
        }
        if let Some(subscription) = self.core.borrow().subscription.as_ref() {
            subscription.set_paused(false);
        }
    }

    /// Per-frame path: advance, fire `changed`, then the finish check,
    /// strictly in that order. A `changed` observer may complete the
    /// animator re-entrantly, hence the re-check before finishing.
    fn handle_frame(&self, dt: f32) {
        if self.state() != AnimatorState::Running {
            return;
        }
        let snapshot = {
            let mut core = self.core.borrow_mut();
            core.animation.advance(dt);
            core.animation.clone()
        };
        self.events.changed.emit(&snapshot);
        if self.state() == AnimatorState::Running && self.core.borrow().animation.is_finished() {
            self.complete(Completion::Finished);
        }
    }

    /// The single terminal transition. Releases the clock subscription
    /// before the terminal event fires, so no tick can reach a completed
    /// animator.
    fn complete(&self, outcome: Completion) {
        if !self.transition(AnimatorState::Completed(outcome)) {
            return;
        }
        let released = self.core.borrow_mut().subscription.take();
        drop(released);
        let snapshot = self.snapshot();
        match outcome {
            Completion::Cancelled => self.events.cancelled.emit(&snapshot),
            Completion::Finished => self.events.finished.emit(&snapshot),
        }
    }
}

/// Drives one animation value on a shared frame clock.
///
/// Constructed in `Pending`; driven by [`start`](Animator::start),
/// [`pause`](Animator::pause), [`resume`](Animator::resume),
/// [`cancel`](Animator::cancel) and by per-frame completion checks. If the
/// animator is dropped before reaching a terminal state it is cancelled,
/// which also releases its clock subscription.
pub struct Animator<A: Animation + Clone> {
    shared: Rc<AnimatorShared<A>>,
}

impl<A: Animation + Clone + 'static> Animator<A> {
    /// Create an animator on the thread-shared clock.
    pub fn new(animation: A) -> Self {
        Self::with_clock(&FrameClock::shared(), animation)
    }

    /// Create an animator driven by an explicit clock. Tests inject a
    /// manually ticked clock here.
    pub fn with_clock(clock: &FrameClock, animation: A) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<AnimatorShared<A>>| {
            let weak = weak.clone();
            // The subscription starts paused; `start()` activates it. The
            // weak back-reference keeps the clock from owning the animator.
            let subscription = clock.subscribe(move |dt| {
                if let Some(shared) = weak.upgrade() {
                    shared.handle_frame(dt);
                }
            });
            AnimatorShared {
                core: RefCell::new(AnimatorCore {
                    state: AnimatorState::Pending,
                    animation,
                    subscription: Some(subscription),
                }),
                events: AnimatorEvents::new(),
            }
        });
        Self { shared }
    }

    /// Begin driving the animation. No-op unless `Pending`.
    pub fn start(&self) {
        self.shared.start();
    }

    /// Detach from the frame feed. No-op unless `Running`.
    pub fn pause(&self) {
        self.shared.pause();
    }

    /// Reattach to the frame feed. No-op unless `Paused`.
    pub fn resume(&self) {
        self.shared.resume();
    }

    /// Complete with `Cancelled`. No-op once terminal.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    pub fn state(&self) -> AnimatorState {
        self.shared.state()
    }

    /// Read-only access to the owned animation value.
    pub fn animation(&self) -> Ref<'_, A> {
        Ref::map(self.shared.core.borrow(), |core| &core.animation)
    }

    /// The animator's lifecycle broadcast points.
    pub fn events(&self) -> &AnimatorEvents<A> {
        &self.shared.events
    }

    pub fn on_started<F: FnMut(&A) + 'static>(&self, observer: F) {
        self.shared.events.started.observe(observer);
    }

    pub fn on_paused<F: FnMut(&A) + 'static>(&self, observer: F) {
        self.shared.events.paused.observe(observer);
    }

    pub fn on_resumed<F: FnMut(&A) + 'static>(&self, observer: F) {
        self.shared.events.resumed.observe(observer);
    }

    pub fn on_changed<F: FnMut(&A) + 'static>(&self, observer: F) {
        self.shared.events.changed.observe(observer);
    }

    pub fn on_cancelled<F: FnMut(&A) + 'static>(&self, observer: F) {
        self.shared.events.cancelled.observe(observer);
    }

    pub fn on_finished<F: FnMut(&A) + 'static>(&self, observer: F) {
        self.shared.events.finished.observe(observer);
    }
}

impl<A: Animation + Clone> Drop for Animator<A> {
    fn drop(&mut self) {
        // A non-terminal animator is force-cancelled so its clock
        // subscription never outlives it.
        if !self.shared.state().is_terminal() {
            self.shared.cancel();
        }
    }
}
