//! Shared frame clock
//!
//! One clock instance owns a registry of pausable subscriptions and fans a
//! single elapsed-time value out to all of them once per frame. Everything
//! runs on the thread that drives the clock; subscription callbacks may
//! synchronously subscribe, unsubscribe, or pause without corrupting the
//! delivery pass.

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

new_key_type! {
    /// Unique identifier for a clock subscription
    pub struct SubscriptionId;
}

type FrameCallback = Box<dyn FnMut(f32)>;

struct SubscriptionSlot {
    paused: bool,
    /// Taken out of the slot while it runs, so a re-entrant
    /// subscribe/unsubscribe cannot alias the callback being invoked.
    callback: Option<FrameCallback>,
}

struct ClockInner {
    subscriptions: SlotMap<SubscriptionId, SubscriptionSlot>,
    /// Delivery order. SlotMap iteration follows slot indices, which
    /// diverges from registration order once freed slots are reused.
    order: Vec<SubscriptionId>,
    last_tick: Option<Instant>,
}

thread_local! {
    static SHARED_CLOCK: FrameClock = FrameClock::new();
}

/// A per-frame elapsed-time source shared by any number of subscribers.
///
/// Cheap to clone; clones share the same subscriber set. Most code uses
/// the lazily initialized thread-local instance from [`FrameClock::shared`]
/// and lets the platform frame loop drive it with [`FrameClock::tick`].
/// Tests construct their own clock and drive it with
/// [`FrameClock::advance_by`].
#[derive(Clone)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
    ticking: Rc<Cell<bool>>,
}

impl FrameClock {
    /// Create a clock with no subscribers and no tick history.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ClockInner {
                subscriptions: SlotMap::with_key(),
                order: Vec::new(),
                last_tick: None,
            })),
            ticking: Rc::new(Cell::new(false)),
        }
    }

    /// The shared clock for the current thread, created on first use.
    pub fn shared() -> Self {
        SHARED_CLOCK.with(Clone::clone)
    }

    /// Register a callback to receive per-frame elapsed seconds.
    ///
    /// The subscription starts paused; the owner activates it with
    /// [`Subscription::set_paused`]. Dropping the returned token
    /// deregisters the callback.
    pub fn subscribe<F>(&self, on_frame: F) -> Subscription
    where
        F: FnMut(f32) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.subscriptions.insert(SubscriptionSlot {
                paused: true,
                callback: Some(Box::new(on_frame)),
            });
            inner.order.push(id);
            id
        };
        tracing::debug!(?id, "frame clock: subscription registered");
        Subscription {
            id,
            clock: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver one frame, measuring elapsed time since the previous tick.
    ///
    /// The first tick after construction has no predecessor and delivers
    /// an elapsed time of zero.
    pub fn tick(&self) {
        let now = Instant::now();
        let dt = match self.inner.borrow_mut().last_tick.replace(now) {
            Some(previous) => (now - previous).as_secs_f32(),
            None => 0.0,
        };
        self.fan_out(dt);
    }

    /// Deliver one frame with an explicit elapsed time in seconds.
    pub fn advance_by(&self, dt: f32) {
        debug_assert!(dt >= 0.0, "elapsed time must be non-negative");
        self.inner.borrow_mut().last_tick = Some(Instant::now());
        self.fan_out(dt.max(0.0));
    }

    /// Every unpaused subscription in this pass observes the same `dt`.
    fn fan_out(&self, dt: f32) {
        if self.ticking.replace(true) {
            tracing::warn!("frame clock: tick re-entered, skipping delivery");
            return;
        }

        // Snapshot of the ids active at the start of the frame, in
        // registration order; a subscription created by a callback first
        // sees the next frame.
        let ids: Vec<SubscriptionId> = {
            let inner = self.inner.borrow();
            inner
                .order
                .iter()
                .copied()
                .filter(|id| inner.subscriptions.get(*id).is_some_and(|slot| !slot.paused))
                .collect()
        };

        for id in ids {
            // Re-check paused: an earlier callback this frame may have
            // paused this subscription.
            let taken = {
                let mut inner = self.inner.borrow_mut();
                inner
                    .subscriptions
                    .get_mut(id)
                    .filter(|slot| !slot.paused)
                    .and_then(|slot| slot.callback.take())
            };
            let Some(mut callback) = taken else { continue };
            callback(dt);
            // The slot is gone if the callback released its own
            // subscription mid-delivery.
            if let Some(slot) = self.inner.borrow_mut().subscriptions.get_mut(id) {
                slot.callback = Some(callback);
            }
        }

        self.ticking.set(false);
    }

    /// Number of registered subscriptions, paused ones included.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Whether any subscription is registered. The embedding frame loop
    /// can stop scheduling ticks when this is false.
    pub fn has_subscribers(&self) -> bool {
        !self.inner.borrow().subscriptions.is_empty()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration with a [`FrameClock`].
///
/// Starts paused. Dropping the token deregisters the callback; no further
/// frames are delivered once it is gone.
pub struct Subscription {
    id: SubscriptionId,
    clock: Weak<RefCell<ClockInner>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Pause or resume frame delivery for this subscription.
    pub fn set_paused(&self, paused: bool) {
        if let Some(inner) = self.clock.upgrade() {
            if let Some(slot) = inner.borrow_mut().subscriptions.get_mut(self.id) {
                slot.paused = paused;
            }
        }
    }

    /// Whether frame delivery is currently paused. Reports true if the
    /// clock itself is gone.
    pub fn is_paused(&self) -> bool {
        self.clock
            .upgrade()
            .and_then(|inner| inner.borrow().subscriptions.get(self.id).map(|slot| slot.paused))
            .unwrap_or(true)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.clock.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.subscriptions.remove(self.id);
            inner.order.retain(|id| *id != self.id);
            tracing::debug!(id = ?self.id, "frame clock: subscription released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_subscription(clock: &FrameClock) -> (Subscription, Rc<RefCell<Vec<f32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = clock.subscribe(move |dt| sink.borrow_mut().push(dt));
        (subscription, seen)
    }

    #[test]
    fn subscription_starts_paused() {
        let clock = FrameClock::new();
        let (subscription, seen) = recording_subscription(&clock);

        assert!(subscription.is_paused());
        clock.advance_by(0.1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn advance_delivers_elapsed_to_active_subscriptions() {
        let clock = FrameClock::new();
        let (subscription, seen) = recording_subscription(&clock);

        subscription.set_paused(false);
        clock.advance_by(0.25);
        clock.advance_by(0.5);

        assert_eq!(*seen.borrow(), vec![0.25, 0.5]);
    }

    #[test]
    fn same_dt_in_registration_order() {
        let clock = FrameClock::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let sink = order.clone();
        let first = clock.subscribe(move |dt| sink.borrow_mut().push(("first", dt)));
        let sink = order.clone();
        let second = clock.subscribe(move |dt| sink.borrow_mut().push(("second", dt)));

        first.set_paused(false);
        second.set_paused(false);
        clock.advance_by(1.0 / 60.0);

        let order = order.borrow();
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].0, "first");
        assert_eq!(order[1].0, "second");
        assert_eq!(order[0].1, order[1].1);
    }

    #[test]
    fn pause_skips_delivery_until_resumed() {
        let clock = FrameClock::new();
        let (subscription, seen) = recording_subscription(&clock);

        subscription.set_paused(false);
        clock.advance_by(0.1);
        subscription.set_paused(true);
        clock.advance_by(0.1);
        subscription.set_paused(false);
        clock.advance_by(0.2);

        assert_eq!(*seen.borrow(), vec![0.1, 0.2]);
    }

    #[test]
    fn drop_deregisters() {
        let clock = FrameClock::new();
        let (subscription, seen) = recording_subscription(&clock);
        subscription.set_paused(false);

        assert_eq!(clock.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(clock.subscriber_count(), 0);
        assert!(!clock.has_subscribers());

        clock.advance_by(0.1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_during_tick_is_safe() {
        let clock = FrameClock::new();
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0u32));

        let held = holder.clone();
        let counter = count.clone();
        let subscription = clock.subscribe(move |_| {
            counter.set(counter.get() + 1);
            held.borrow_mut().take();
        });
        subscription.set_paused(false);
        *holder.borrow_mut() = Some(subscription);

        clock.advance_by(0.1);
        clock.advance_by(0.1);

        assert_eq!(count.get(), 1);
        assert_eq!(clock.subscriber_count(), 0);
    }

    #[test]
    fn subscribe_during_tick_starts_next_frame() {
        let clock = FrameClock::new();
        let late_values = Rc::new(RefCell::new(Vec::new()));
        let late_holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let inner_clock = clock.clone();
        let holder = late_holder.clone();
        let values = late_values.clone();
        let first = clock.subscribe(move |_| {
            if holder.borrow().is_none() {
                let sink = values.clone();
                let late = inner_clock.subscribe(move |dt| sink.borrow_mut().push(dt));
                late.set_paused(false);
                *holder.borrow_mut() = Some(late);
            }
        });
        first.set_paused(false);

        clock.advance_by(0.1);
        assert!(late_values.borrow().is_empty());

        clock.advance_by(0.2);
        assert_eq!(*late_values.borrow(), vec![0.2]);
    }

    #[test]
    fn registration_order_survives_slot_reuse() {
        let clock = FrameClock::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let sink = order.clone();
        let first = clock.subscribe(move |_| sink.borrow_mut().push("first"));
        let sink = order.clone();
        let second = clock.subscribe(move |_| sink.borrow_mut().push("second"));
        first.set_paused(false);
        second.set_paused(false);

        // Free the first slot, then register again; the older survivor
        // must still be delivered to before the newcomer.
        drop(first);
        let sink = order.clone();
        let third = clock.subscribe(move |_| sink.borrow_mut().push("third"));
        third.set_paused(false);

        clock.advance_by(0.1);
        assert_eq!(*order.borrow(), vec!["second", "third"]);
    }

    #[test]
    fn first_tick_delivers_zero_elapsed() {
        let clock = FrameClock::new();
        let (subscription, seen) = recording_subscription(&clock);
        subscription.set_paused(false);

        clock.tick();
        clock.tick();

        let seen = seen.borrow();
        assert_eq!(seen[0], 0.0);
        assert!(seen[1] >= 0.0);
    }

    #[test]
    fn subscription_outliving_clock_noops() {
        let subscription = {
            let clock = FrameClock::new();
            clock.subscribe(|_| {})
        };

        assert!(subscription.is_paused());
        subscription.set_paused(false);
        assert!(subscription.is_paused());
    }
}
