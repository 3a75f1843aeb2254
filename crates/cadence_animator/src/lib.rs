//! Cadence Animator
//!
//! A one-shot animation driver over the Cadence frame clock:
//!
//! - **Animation capability**: any value implementing [`Animation`]
//!   (advance by elapsed seconds, report completion) can be driven
//! - **Lifecycle state machine**: `Pending → Running ⇄ Paused` into the
//!   terminal `Completed(Cancelled | Finished)`, reached exactly once
//! - **Lifecycle events**: `started`, `paused`, `resumed`, `changed`,
//!   `cancelled`, `finished`, delivered synchronously in registration
//!   order with a snapshot of the animation value
//! - **Cancel on drop**: a non-terminal animator is cancelled on teardown
//!   and its clock subscription released
//! - **Stock animations**: [`TimedAnimation`] with [`Easing`] curves for
//!   simple fixed-duration interpolation
//!
//! # Example
//!
//! ```rust
//! use cadence_animator::{Animator, AnimatorState, Completion, FrameClock, TimedAnimation};
//!
//! let clock = FrameClock::new();
//! let animator = Animator::with_clock(&clock, TimedAnimation::new(0.0, 100.0, 1.0));
//!
//! animator.on_changed(|animation| println!("value: {}", animation.value()));
//!
//! animator.start();
//! assert_eq!(animator.state(), AnimatorState::Running);
//!
//! clock.advance_by(0.5);
//! assert!((animator.animation().value() - 50.0).abs() < 1e-3);
//!
//! clock.advance_by(0.6);
//! assert_eq!(animator.state(), AnimatorState::Completed(Completion::Finished));
//! ```

pub mod animation;
pub mod animator;
pub mod events;
pub mod timed;

pub use animation::Animation;
pub use animator::{Animator, AnimatorEvents, AnimatorState, Completion};
pub use events::EventSource;
pub use timed::{Easing, TimedAnimation};

// Re-export the clock so consumers need a single dependency.
pub use cadence_clock::{FrameClock, Subscription, SubscriptionId};
