//! Lifecycle event broadcast
//!
//! Each animator lifecycle event is an independent broadcast point.
//! Observers run synchronously on the thread driving the frame clock, in
//! registration order.

use smallvec::SmallVec;
use std::cell::RefCell;

type Observer<A> = Box<dyn FnMut(&A)>;

/// A broadcast point accepting any number of observers for one event.
///
/// Registering from inside a delivery is allowed; the new observer joins
/// from the next event onward.
pub struct EventSource<A> {
    observers: RefCell<SmallVec<[Observer<A>; 2]>>,
}

impl<A> EventSource<A> {
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(SmallVec::new()),
        }
    }

    /// Register an observer. Observers live as long as the event source.
    pub fn observe<F>(&self, observer: F)
    where
        F: FnMut(&A) + 'static,
    {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Deliver `value` to every observer, in registration order.
    ///
    /// Observers run with the list taken out of the cell, so a re-entrant
    /// `observe` pushes into a fresh list instead of aliasing the one
    /// being iterated; the two are merged afterwards.
    pub(crate) fn emit(&self, value: &A) {
        let mut active = self.observers.take();
        for observer in active.iter_mut() {
            observer(value);
        }
        let added = self.observers.take();
        active.extend(added);
        *self.observers.borrow_mut() = active;
    }
}

impl<A> Default for EventSource<A> {
    fn default() -> Self {
        Self::new()
    }
}
