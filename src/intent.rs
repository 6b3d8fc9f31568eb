//! Movement intent and the jump latch.
//!
//! Intents are written by player input or AI during the input phase and read
//! by the controller on the next fixed step.

use bevy::prelude::*;

/// One-shot jump request.
///
/// `request()` arms the latch. The next tick consumes it unconditionally; if
/// the actor was not grounded at that moment the request is dropped, not
/// carried over.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JumpLatch {
    #[default]
    Idle,
    Pending,
}

impl JumpLatch {
    /// Arm the latch. Idempotent while already pending.
    pub fn request(&mut self) {
        *self = JumpLatch::Pending;
    }

    /// Whether a jump is waiting for the next tick.
    pub fn is_pending(&self) -> bool {
        matches!(self, JumpLatch::Pending)
    }

    /// Return the latch to idle, reporting whether it was pending.
    pub fn consume(&mut self) -> bool {
        std::mem::take(self).is_pending()
    }

    /// Consume the latch and resolve it against this tick's ground state.
    ///
    /// Returns the vertical velocity to set, if the jump fires.
    pub fn resolve(&mut self, grounded: bool, impulse: f32) -> Option<f32> {
        (self.consume() && grounded).then_some(impulse)
    }
}

/// Movement intent for a locomotion controller.
///
/// # Example
///
/// ```rust
/// use platform_locomotion::prelude::*;
///
/// let mut intent = LocomotionIntent::default();
/// intent.set_walk(-1.0);
/// intent.request_jump();
/// assert_eq!(intent.walk, -1.0);
/// assert!(intent.jump.is_pending());
/// ```
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionIntent {
    /// Horizontal move intent. Scaled by `max_speed`; not clamped.
    pub walk: f32,
    /// Pending jump, if any.
    pub jump: JumpLatch,
}

impl LocomotionIntent {
    /// Set the horizontal move intent. Last write wins.
    pub fn set_walk(&mut self, walk: f32) {
        self.walk = walk;
    }

    /// Arm the jump latch.
    pub fn request_jump(&mut self) {
        self.jump.request();
    }
}
