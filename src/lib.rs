//! # `platform_locomotion`
//!
//! A slope-aware 2D platformer locomotion controller with physics backend
//! abstraction.
//!
//! Each fixed step, a controlled actor runs four stages in order:
//! 1. **Ground sensor**: a downward circle probe decides whether the actor
//!    stands on walkable ground, and records the surface normal and the
//!    supporting entity
//! 2. **Horizontal integrator**: walk intent is pursued along the ground
//!    tangent (or the world x axis while airborne), bounded by the body's
//!    actual speed so collisions bleed momentum
//! 3. **Jump latch**: a jump request is consumed by the next tick and fires
//!    only if the actor is grounded on that tick
//! 4. **Elevator coupling**: the velocity of a supporting moving platform is
//!    added on top
//!
//! Gravity is switched off while grounded so the actor does not slide down
//! slopes it is allowed to stand on.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platform_locomotion::prelude::*;
//!
//! // Components for a controlled actor
//! let controller = LocomotionController::new();
//! let config = LocomotionConfig::player();
//!
//! // Spawn them together with a physics body and a collider
//! ```
//!
//! The pure stages are usable without an app: see
//! [`LocomotionController::tick`](controller::LocomotionController::tick).

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod controller;
pub mod elevator;
pub mod error;
pub mod intent;
pub mod movement;
pub mod sensor;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::LocomotionBackend;
    pub use crate::collision::CollisionData;
    pub use crate::config::LocomotionConfig;
    pub use crate::controller::{BodyState, CharacterController2d, LocomotionController};
    pub use crate::elevator::{Elevator, ElevatorLookup, NoElevators};
    pub use crate::error::{ConfigError, LocomotionError};
    pub use crate::intent::{JumpLatch, LocomotionIntent};
    pub use crate::sensor::{GroundProbe, GroundReading, ProbeRequest, ShapeBounds};
    pub use crate::state::{Airborne, Grounded, OnElevator};
    pub use crate::{LocomotionPlugin, LocomotionSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dLocomotionBundle};
}

/// System sets for the locomotion pipeline, run in this order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Validate and bring up newly spawned controllers.
    Initialize,
    /// Ground probing. Backends add their sensor systems here.
    Sensors,
    /// Gravity scale, horizontal integration, jump and elevator coupling.
    Movement,
    /// State marker upkeep.
    Sync,
}

/// Main plugin for the locomotion controller.
///
/// This plugin is generic over a physics backend `B` which provides the body
/// access and the ground probe.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platform_locomotion::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(LocomotionPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct LocomotionPlugin<B: backend::LocomotionBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::LocomotionBackend> Default for LocomotionPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::LocomotionBackend> Plugin for LocomotionPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<controller::LocomotionController>();
        app.register_type::<intent::LocomotionIntent>();
        app.register_type::<intent::JumpLatch>();
        app.register_type::<elevator::Elevator>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::OnElevator>();

        app.configure_sets(
            FixedUpdate,
            (
                LocomotionSet::Initialize,
                LocomotionSet::Sensors,
                LocomotionSet::Movement,
                LocomotionSet::Sync,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                (
                    systems::initialize_controllers::<B>,
                    systems::clear_ground_readings,
                )
                    .chain()
                    .in_set(LocomotionSet::Initialize),
                systems::apply_locomotion::<B>.in_set(LocomotionSet::Movement),
                systems::sync_state_markers.in_set(LocomotionSet::Sync),
            ),
        );
    }
}
