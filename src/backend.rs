//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the locomotion controller. This allows easy swapping
//! between physics engines (Rapier2D, custom, etc.).

use bevy::prelude::*;

use crate::controller::BodyState;
use crate::sensor::ShapeBounds;

/// Trait for physics backend implementations.
///
/// The backend exposes the rigid-body quantities the controller drives
/// (velocity and gravity scale) and the bounds of the actor's collision shape.
/// Ground probing needs engine query state, so the backend's [`plugin`] installs
/// its own sensor system in [`LocomotionSet::Sensors`]; that system builds a
/// [`GroundProbe`] and feeds the controller.
///
/// For an example implementation, see the `rapier` module's `Rapier2dBackend`.
///
/// [`plugin`]: LocomotionBackend::plugin
/// [`LocomotionSet::Sensors`]: crate::LocomotionSet::Sensors
/// [`GroundProbe`]: crate::sensor::GroundProbe
pub trait LocomotionBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Whether the entity has a rigid body the controller can drive.
    fn has_body(world: &World, entity: Entity) -> bool;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the gravity scale of an entity. Bodies without an explicit scale report 1.
    fn get_gravity_scale(world: &World, entity: Entity) -> f32;

    /// Set the gravity scale of an entity.
    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32);

    /// World-space bounds of the entity's collision shape, if it has one.
    fn shape_bounds(world: &World, entity: Entity) -> Option<ShapeBounds>;

    /// Get the configured fixed timestep, falling back to 60 Hz.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.timestep().as_secs_f32())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    /// Read the body into a [`BodyState`], or `None` if the entity has no body.
    fn read_body(world: &World, entity: Entity) -> Option<BodyState> {
        Self::has_body(world, entity).then(|| {
            BodyState::new(
                Self::get_velocity(world, entity),
                Self::get_gravity_scale(world, entity),
            )
        })
    }

    /// Write a [`BodyState`] back to the body.
    fn write_body(world: &mut World, entity: Entity, body: BodyState) {
        Self::set_velocity(world, entity, body.velocity);
        Self::set_gravity_scale(world, entity, body.gravity_scale);
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
