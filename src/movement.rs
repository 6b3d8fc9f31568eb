//! Horizontal velocity integration.
//!
//! The integrator keeps one scalar of memory, the accumulated speed. Every tick
//! it is first clamped to what the body is actually doing, then pursued toward
//! the speed asked for by the move intent. Clamping first lets wall hits and
//! launches bleed into player control instead of being overridden by it.

use bevy::prelude::*;

/// Advance `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Clamp into `[-bound, bound]`. NaN bounds leave the value alone instead of panicking.
#[inline]
pub fn clamp_symmetric(value: f32, bound: f32) -> f32 {
    let bound = bound.abs();
    if value < -bound {
        -bound
    } else if value > bound {
        bound
    } else {
        value
    }
}

/// Walkable direction along a surface: the normal turned 90° clockwise.
///
/// Positive speed along the tangent moves the actor to the right (and uphill
/// on a slope rising to the right).
#[inline]
pub fn ground_tangent(normal: Vec2) -> Vec2 {
    Vec2::new(normal.y, -normal.x).normalize_or_zero()
}

/// Per-tick inputs shared by both integration modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pursuit {
    /// Speed the intent asks for (`intent * max_speed`).
    pub target: f32,
    /// Largest change allowed this tick (`acceleration * dt`).
    pub max_delta: f32,
}

impl Pursuit {
    /// Build a pursuit step from intent and tuning.
    pub fn new(intent: f32, max_speed: f32, acceleration: f32, dt: f32) -> Self {
        Self {
            target: intent * max_speed,
            max_delta: acceleration * dt,
        }
    }
}

/// Integrate along the ground surface.
///
/// Clamps `accumulated_speed` to the incoming speed along the tangent, pursues
/// the target, and returns the full velocity along the tangent. Both components
/// of the result replace the incoming velocity.
pub fn integrate_grounded(
    accumulated_speed: &mut f32,
    velocity: Vec2,
    ground_normal: Vec2,
    pursuit: Pursuit,
) -> Vec2 {
    let tangent = ground_tangent(ground_normal);
    let speed_on_ground = velocity.dot(tangent).abs();

    *accumulated_speed = clamp_symmetric(*accumulated_speed, speed_on_ground);
    *accumulated_speed = move_towards(*accumulated_speed, pursuit.target, pursuit.max_delta);

    tangent * *accumulated_speed
}

/// Integrate along world x while airborne.
///
/// Clamps `accumulated_speed` to the incoming `|velocity.x|`, pursues the target,
/// and writes only the x component. Vertical motion is left to gravity.
pub fn integrate_airborne(accumulated_speed: &mut f32, velocity: Vec2, pursuit: Pursuit) -> Vec2 {
    *accumulated_speed = clamp_symmetric(*accumulated_speed, velocity.x.abs());
    *accumulated_speed = move_towards(*accumulated_speed, pursuit.target, pursuit.max_delta);

    Vec2::new(*accumulated_speed, velocity.y)
}
