//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::math::{Isometry, Vector};

use crate::backend::LocomotionBackend;
use crate::collision::CollisionData;
use crate::config::LocomotionConfig;
use crate::controller::LocomotionController;
use crate::elevator::Elevator;
use crate::sensor::{sense_ground, ProbeRequest, ShapeBounds};
use crate::LocomotionSet;

/// Rapier2D physics backend for the locomotion controller.
///
/// Velocity and gravity scale map onto Rapier's [`Velocity`] and
/// [`GravityScale`] components. Ground probing is handled by a dedicated
/// Rapier system that receives `RapierContext` as a system parameter.
pub struct Rapier2dBackend;

impl LocomotionBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn has_body(world: &World, entity: Entity) -> bool {
        world.get::<RigidBody>(entity).is_some()
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        } else if let Ok(mut entity) = world.get_entity_mut(entity) {
            entity.insert(Velocity::linear(velocity));
        }
    }

    fn get_gravity_scale(world: &World, entity: Entity) -> f32 {
        world.get::<GravityScale>(entity).map(|g| g.0).unwrap_or(1.0)
    }

    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32) {
        if let Some(mut gravity) = world.get_mut::<GravityScale>(entity) {
            // Only touch the component on change so Rapier doesn't resync every step
            if gravity.0 != scale {
                gravity.0 = scale;
            }
        } else if let Ok(mut entity) = world.get_entity_mut(entity) {
            entity.insert(GravityScale(scale));
        }
    }

    fn shape_bounds(world: &World, entity: Entity) -> Option<ShapeBounds> {
        let collider = world.get::<Collider>(entity)?;
        let transform = world
            .get::<GlobalTransform>(entity)
            .copied()
            .unwrap_or_default();
        Some(collider_bounds(collider, &transform))
    }
}

/// Plugin that sets up Rapier2D-specific systems for the locomotion controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        // Elevator velocities must be current before anyone couples to them
        app.add_systems(
            FixedUpdate,
            (track_elevator_bodies, rapier_ground_sensor)
                .chain()
                .in_set(LocomotionSet::Sensors),
        );
    }
}

/// World-space axis-aligned bounds of a collider.
pub fn collider_bounds(collider: &Collider, transform: &GlobalTransform) -> ShapeBounds {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    let (_, _, angle) = rotation.to_euler(EulerRot::XYZ);
    let position = Isometry::new(Vector::new(translation.x, translation.y), angle);
    let aabb = collider.raw.compute_aabb(&position);
    ShapeBounds::from_min_max(
        Vec2::new(aabb.mins.x, aabb.mins.y),
        Vec2::new(aabb.maxs.x, aabb.maxs.y),
    )
}

/// Perform a circle cast using RapierContext.
fn rapier_circle_cast(
    context: &RapierContext,
    request: &ProbeRequest,
    exclude_entity: Entity,
) -> Option<CollisionData> {
    let shape = Collider::ball(request.radius);

    // Exclude the caster and sensors, and only hit walkable layers
    let filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(request.mask),
        ));

    context
        .cast_shape(
            request.origin,
            0.0,
            request.direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: request.max_distance,
                stop_at_penetration: true,
                ..default()
            },
            filter,
        )
        .map(|(hit_entity, hit)| {
            let normal = hit.details.map(|d| d.normal1).unwrap_or(-request.direction);
            CollisionData::new(hit.time_of_impact, normal, Some(hit_entity))
        })
}

/// Rapier-specific ground sensor.
///
/// Casts the downward probe from the collider's current world bounds and
/// hands the reading to the controller.
fn rapier_ground_sensor(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &Collider,
        &LocomotionConfig,
        &mut LocomotionController,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, collider, config, mut controller) in &mut q_controllers {
        if !controller.is_initialized() {
            continue;
        }

        let bounds = collider_bounds(collider, transform);
        let probe = |request: &ProbeRequest| rapier_circle_cast(&context, request, entity);
        let reading = sense_ground(
            &probe,
            bounds,
            config.walkable_mask,
            config.max_slope_angle,
        );
        controller.apply_ground_reading(reading);
    }
}

/// Copy rigid-body velocity into elevators that track their body.
pub fn track_elevator_bodies(mut q_elevators: Query<(&mut Elevator, &Velocity)>) {
    for (mut elevator, velocity) in &mut q_elevators {
        if elevator.track_body && elevator.velocity != velocity.linvel {
            elevator.velocity = velocity.linvel;
        }
    }
}

/// Bundle containing the Rapier2D physics components a controlled actor needs.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platform_locomotion::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         LocomotionController::new(),
///         LocomotionConfig::player(),
///         Rapier2dLocomotionBundle::new(),
///         Collider::capsule_y(0.5, 0.25),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `gravity_scale`: 1.0, captured by the controller as the airborne scale
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`]
/// - `friction`: Zero, combined with `Min` so walls and floors never grab the actor
#[derive(Bundle)]
pub struct Rapier2dLocomotionBundle {
    /// The rigid body type. Should be [`RigidBody::Dynamic`] for actors.
    pub rigid_body: RigidBody,
    /// Linear velocity. Written by the controller every fixed step.
    pub velocity: Velocity,
    /// Toggled between 0 (grounded) and the captured default (airborne).
    pub gravity_scale: GravityScale,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Contact friction of the actor's collider.
    pub friction: Friction,
}

impl Default for Rapier2dLocomotionBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dLocomotionBundle {
    /// Create a new actor bundle with rotation locked and no friction.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            gravity_scale: GravityScale(1.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
        }
    }

    /// Set the gravity scale the actor falls with while airborne.
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = GravityScale(scale);
        self
    }

    /// Set the actor's contact friction.
    pub fn with_friction(mut self, friction: Friction) -> Self {
        self.friction = friction;
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn rapier_backend_velocity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity::linear(Vec2::new(5.0, 3.0)),
            ))
            .id();

        app.update();

        assert!(Rapier2dBackend::has_body(app.world(), entity));
        let vel = Rapier2dBackend::get_velocity(app.world(), entity);
        assert!((vel.x - 5.0).abs() < 0.01);

        Rapier2dBackend::set_velocity(app.world_mut(), entity, Vec2::new(10.0, 0.0));

        let vel = Rapier2dBackend::get_velocity(app.world(), entity);
        assert!((vel.x - 10.0).abs() < 0.01);
        assert!(vel.y.abs() < 0.01);
    }

    #[test]
    fn rapier_backend_gravity_scale() {
        let mut world = World::new();
        let entity = world.spawn(RigidBody::Dynamic).id();

        assert_eq!(Rapier2dBackend::get_gravity_scale(&world, entity), 1.0);

        Rapier2dBackend::set_gravity_scale(&mut world, entity, 0.0);
        assert_eq!(world.get::<GravityScale>(entity).map(|g| g.0), Some(0.0));

        Rapier2dBackend::set_gravity_scale(&mut world, entity, 2.5);
        assert_eq!(Rapier2dBackend::get_gravity_scale(&world, entity), 2.5);
    }

    #[test]
    fn entity_without_rigid_body_has_no_body() {
        let mut world = World::new();
        let entity = world.spawn(Collider::ball(1.0)).id();

        assert!(!Rapier2dBackend::has_body(&world, entity));
        assert!(Rapier2dBackend::read_body(&world, entity).is_none());
    }

    #[test]
    fn capsule_bounds_follow_transform() {
        let collider = Collider::capsule_y(0.5, 0.25);
        let bounds = collider_bounds(&collider, &GlobalTransform::from_xyz(1.0, 2.0, 0.0));

        assert!((bounds.center - Vec2::new(1.0, 2.0)).length() < 1e-5);
        assert!((bounds.size - Vec2::new(0.5, 1.5)).length() < 1e-5);
        assert!((bounds.probe_radius() - 0.15).abs() < 1e-5);
    }

    #[test]
    fn shape_bounds_requires_collider() {
        let mut world = World::new();
        let bare = world.spawn(RigidBody::Dynamic).id();
        let shaped = world
            .spawn((RigidBody::Dynamic, Collider::cuboid(1.0, 2.0)))
            .id();

        assert!(Rapier2dBackend::shape_bounds(&world, bare).is_none());
        let bounds = Rapier2dBackend::shape_bounds(&world, shaped).unwrap();
        assert!((bounds.size - Vec2::new(2.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn tracking_elevator_copies_body_velocity() {
        let mut world = World::new();
        let tracked = world
            .spawn((Elevator::tracking(), Velocity::linear(Vec2::new(0.0, 1.5))))
            .id();
        let scripted = world
            .spawn((Elevator::new(Vec2::X), Velocity::linear(Vec2::new(9.0, 9.0))))
            .id();

        world.run_system_once(track_elevator_bodies).unwrap();

        assert_eq!(world.get::<Elevator>(tracked).unwrap().velocity, Vec2::new(0.0, 1.5));
        assert_eq!(world.get::<Elevator>(scripted).unwrap().velocity, Vec2::X);
    }

    #[test]
    fn locomotion_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Rapier2dLocomotionBundle::new().with_gravity_scale(3.0),
                Collider::capsule_y(0.5, 0.25),
            ))
            .id();

        app.update();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert_eq!(app.world().get::<GravityScale>(entity).map(|g| g.0), Some(3.0));
        assert_eq!(
            app.world().get::<LockedAxes>(entity),
            Some(&LockedAxes::ROTATION_LOCKED)
        );
    }
}
