//! Core controller systems.
//!
//! These systems drive [`LocomotionController`] components inside a Bevy app.
//! They are generic over the physics backend; the backend-specific ground
//! sensor runs between [`initialize_controllers`] and [`apply_locomotion`].

use bevy::ecs::error::BevyError;
use bevy::prelude::*;

use crate::backend::LocomotionBackend;
use crate::config::LocomotionConfig;
use crate::controller::LocomotionController;
use crate::elevator::Elevator;
use crate::error::LocomotionError;
use crate::state::{Airborne, Grounded, OnElevator};

/// Bring newly spawned controllers up.
///
/// Validates the config against the fixed timestep, checks that the actor has
/// a physics body and a collision shape, and captures the body's gravity
/// scale. Any failure is returned to Bevy's error handler, which panics by
/// default.
pub fn initialize_controllers<B: LocomotionBackend>(world: &mut World) -> Result<(), BevyError> {
    let dt = B::get_fixed_timestep(world);

    let pending: Vec<(Entity, LocomotionConfig)> = world
        .query::<(Entity, &LocomotionConfig, &LocomotionController)>()
        .iter(world)
        .filter(|(_, _, controller)| !controller.is_initialized())
        .map(|(e, config, _)| (e, *config))
        .collect();

    for (entity, config) in pending {
        let checked = config
            .validate_for_timestep(dt)
            .map_err(LocomotionError::from);
        let body = B::read_body(world, entity);
        let shape = B::shape_bounds(world, entity);

        let Some(mut controller) = world.get_mut::<LocomotionController>(entity) else {
            continue;
        };

        let result = checked.and_then(|()| controller.initialize(entity, &config, body, shape));
        if let Err(err) = result {
            error!("Locomotion controller setup failed: {err}");
            return Err(err.into());
        }

        debug!(
            "Locomotion controller ready on {entity} (default gravity scale {})",
            controller.default_gravity_scale()
        );
    }

    Ok(())
}

/// Forget last tick's ground readings before the sensors run.
///
/// A controller the backend sensor skips this tick (no physics context, shape
/// removed) is treated as airborne with no support.
pub fn clear_ground_readings(mut q_controllers: Query<&mut LocomotionController>) {
    for mut controller in &mut q_controllers {
        if controller.is_initialized() {
            controller.clear_ground_reading();
        }
    }
}

/// Run the post-sensor half of the tick for every initialized controller.
///
/// Reads the body from the backend, applies gravity scale, horizontal
/// integration, the jump latch and elevator coupling, then writes the body
/// back. Elevators are looked up directly in the world.
pub fn apply_locomotion<B: LocomotionBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, LocomotionConfig, LocomotionController)> = world
        .query::<(Entity, &LocomotionConfig, &LocomotionController)>()
        .iter(world)
        .filter(|(_, _, controller)| controller.is_initialized())
        .map(|(e, config, controller)| (e, *config, controller.clone()))
        .collect();

    for (entity, config, mut controller) in entities {
        let Some(mut body) = B::read_body(world, entity) else {
            continue;
        };

        let jumps = controller.jump_pending() && controller.is_grounded();

        controller.step(&config, &mut body, &*world, dt);
        B::write_body(world, entity, body);

        if jumps {
            trace!("{entity} jumped with impulse {}", config.jump_impulse);
        }

        if let Some(mut stored) = world.get_mut::<LocomotionController>(entity) {
            *stored = controller;
        }
    }
}

/// Sync state marker components with the last tick's results.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &LocomotionController,
        Has<Grounded>,
        Has<Airborne>,
        Option<&OnElevator>,
    )>,
    q_elevators: Query<(), With<Elevator>>,
) {
    for (entity, controller, has_grounded, has_airborne, on_elevator) in &q_controllers {
        if !controller.is_initialized() {
            continue;
        }

        // Sync Grounded/Airborne
        if controller.is_grounded() && !has_grounded {
            if has_airborne {
                debug!("{entity} landed");
            }
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !controller.is_grounded() && !has_airborne {
            if has_grounded {
                debug!("{entity} left the ground");
            }
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        // Sync OnElevator
        let elevator = controller
            .current_support()
            .filter(|&support| q_elevators.contains(support));
        match (elevator, on_elevator) {
            (Some(elevator), Some(current)) if current.elevator == elevator => {}
            (Some(elevator), _) => {
                commands.entity(entity).insert(OnElevator::new(elevator));
            }
            (None, Some(_)) => {
                commands.entity(entity).remove::<OnElevator>();
            }
            (None, None) => {}
        }
    }
}
