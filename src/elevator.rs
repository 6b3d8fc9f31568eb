//! Elevator coupling.
//!
//! Anything the actor stands on may carry it along. A surface opts in by
//! exposing a velocity through [`ElevatorLookup`]; in an ECS world that means
//! having an [`Elevator`] component.

use bevy::prelude::*;

/// Moving-platform capability.
///
/// The velocity is added to any actor whose ground probe lands on this entity.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct Elevator {
    /// Current platform velocity.
    pub velocity: Vec2,
    /// Copy the platform's own rigid-body velocity into `velocity` every fixed step.
    pub track_body: bool,
}

impl Elevator {
    /// An elevator with a fixed, script-driven velocity.
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            track_body: false,
        }
    }

    /// An elevator that mirrors its rigid body's velocity.
    pub fn tracking() -> Self {
        Self {
            velocity: Vec2::ZERO,
            track_body: true,
        }
    }
}

/// Lookup of the elevator capability on an arbitrary entity.
pub trait ElevatorLookup {
    /// Velocity of `entity` if it is an elevator.
    fn try_get_elevator(&self, entity: Entity) -> Option<Vec2>;
}

impl ElevatorLookup for World {
    fn try_get_elevator(&self, entity: Entity) -> Option<Vec2> {
        self.get::<Elevator>(entity).map(|e| e.velocity)
    }
}

impl<F> ElevatorLookup for F
where
    F: Fn(Entity) -> Option<Vec2>,
{
    fn try_get_elevator(&self, entity: Entity) -> Option<Vec2> {
        self(entity)
    }
}

/// Lookup for worlds without moving platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElevators;

impl ElevatorLookup for NoElevators {
    fn try_get_elevator(&self, _entity: Entity) -> Option<Vec2> {
        None
    }
}

/// Velocity after coupling to the supporting platform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coupled {
    /// Absolute velocity, platform motion included.
    pub velocity: Vec2,
    /// Velocity with respect to the platform.
    pub relative: Vec2,
}

/// Add the platform velocity, if any, and derive the relative velocity.
pub fn couple(velocity: Vec2, elevator: Option<Vec2>) -> Coupled {
    match elevator {
        Some(platform) => {
            let velocity = velocity + platform;
            Coupled {
                velocity,
                relative: velocity - platform,
            }
        }
        None => Coupled {
            velocity,
            relative: velocity,
        },
    }
}

/// Resolve the support entity through `lookup` and couple.
pub fn couple_to_support<E: ElevatorLookup + ?Sized>(
    velocity: Vec2,
    support: Option<Entity>,
    lookup: &E,
) -> Coupled {
    couple(velocity, support.and_then(|entity| lookup.try_get_elevator(entity)))
}
