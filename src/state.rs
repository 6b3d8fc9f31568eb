//! State marker components.
//!
//! These components mirror the last tick of a [`LocomotionController`] so that
//! other systems can filter on them in queries. They are added and removed by
//! the controller systems.
//!
//! [`LocomotionController`]: crate::controller::LocomotionController

use bevy::prelude::*;

/// Marker component indicating the actor is grounded.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platform_locomotion::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the actor is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Present while the actor's ground probe rests on an [`Elevator`].
///
/// [`Elevator`]: crate::elevator::Elevator
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct OnElevator {
    /// The elevator entity.
    pub elevator: Entity,
}

impl OnElevator {
    /// Create a new elevator contact state.
    pub fn new(elevator: Entity) -> Self {
        Self { elevator }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_elevator_new() {
        let platform = Entity::from_raw(12);
        assert_eq!(OnElevator::new(platform).elevator, platform);
    }
}
