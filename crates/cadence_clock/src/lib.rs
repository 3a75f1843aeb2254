//! Cadence Frame Clock
//!
//! A shared per-frame timing source for animation drivers:
//!
//! - **Fan-out**: each tick delivers one elapsed-time value to every
//!   unpaused subscription, in registration order
//! - **Pausable subscriptions**: registrations start paused and are
//!   activated by their owner
//! - **RAII deregistration**: dropping a [`Subscription`] removes it from
//!   the clock
//! - **Deterministic driving**: [`FrameClock::advance_by`] feeds an
//!   explicit elapsed time, so tests never depend on wall-clock timers
//!
//! The clock produces no ticks on its own. The embedding frame loop calls
//! [`FrameClock::tick`] once per display frame and can stop scheduling
//! frames whenever [`FrameClock::has_subscribers`] reports false.
//!
//! # Example
//!
//! ```rust
//! use cadence_clock::FrameClock;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = FrameClock::new();
//! let seen = Rc::new(Cell::new(0.0f32));
//!
//! let sink = seen.clone();
//! let subscription = clock.subscribe(move |dt| sink.set(sink.get() + dt));
//! subscription.set_paused(false);
//!
//! clock.advance_by(0.25);
//! clock.advance_by(0.25);
//! assert_eq!(seen.get(), 0.5);
//! ```

pub mod clock;

pub use clock::{FrameClock, Subscription, SubscriptionId};
