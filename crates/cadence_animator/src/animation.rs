//! Animation capability
//!
//! The minimal contract the driver requires of an animation value. The
//! animator treats implementors as opaque: it only ever advances them by
//! the frame's elapsed time and reads the finished flag.

/// A mutable progress tracker advanced by elapsed time.
///
/// `is_finished` is consulted after construction, after every `advance`,
/// and on every entry into the running or paused state, so implementations
/// must keep it cheap to read.
pub trait Animation {
    /// Advance internal progress by `dt` seconds. `dt` is non-negative.
    fn advance(&mut self, dt: f32);

    /// Whether the animation has reached its end state.
    fn is_finished(&self) -> bool;
}
