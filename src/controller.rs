//! The locomotion controller.
//!
//! [`LocomotionController`] owns all per-actor state and runs the four stages of
//! a fixed step in order: ground sensor, horizontal integrator, jump latch,
//! elevator coupling. It has no engine dependency of its own; the physics body
//! is passed in as a [`BodyState`] and the world is reached through
//! [`GroundProbe`] and [`ElevatorLookup`].

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::elevator::{couple_to_support, ElevatorLookup};
use crate::error::LocomotionError;
use crate::intent::LocomotionIntent;
use crate::movement::{integrate_airborne, integrate_grounded, Pursuit};
use crate::sensor::{sense_ground, GroundProbe, GroundReading, ShapeBounds};

/// The rigid-body quantities the controller reads and writes each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Linear velocity.
    pub velocity: Vec2,
    /// Multiplier applied to world gravity for this body.
    pub gravity_scale: f32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
        }
    }
}

impl BodyState {
    /// Create a body state.
    pub fn new(velocity: Vec2, gravity_scale: f32) -> Self {
        Self {
            velocity,
            gravity_scale,
        }
    }
}

/// Public surface of a 2D platformer character controller.
///
/// Game code (input handling, animation) can depend on this trait rather than
/// on [`LocomotionController`] directly.
pub trait CharacterController2d {
    /// Whether the character stood on walkable ground during the last tick.
    fn is_grounded(&self) -> bool;

    /// Velocity written to the body during the last tick.
    fn velocity(&self) -> Vec2;

    /// Velocity relative to the elevator the character stands on. Equal to
    /// [`velocity`](Self::velocity) when not on an elevator.
    fn velocity_relative_to_elevator(&self) -> Vec2;

    /// Ask the character to jump on the next tick.
    fn jump(&mut self);

    /// Set the horizontal move intent for the next tick.
    fn set_move(&mut self, intent: f32);
}

/// Core locomotion controller component.
///
/// Holds the sensor result, integrator memory, intent, and the velocities
/// published by the last completed tick.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platform_locomotion::prelude::*;
///
/// let config = LocomotionConfig::default();
/// let bounds = ShapeBounds::new(Vec2::ZERO, Vec2::new(0.5, 1.5));
/// let mut body = BodyState::default();
/// let mut controller =
///     LocomotionController::try_new(Entity::PLACEHOLDER, &config, Some(body), Some(bounds))
///         .unwrap();
///
/// // Flat ground right under the actor
/// let probe = |_: &ProbeRequest| Some(CollisionData::contact(Vec2::Y, None));
///
/// controller.set_move(1.0);
/// controller.tick(&config, bounds, &mut body, &probe, &NoElevators, 1.0 / 50.0);
///
/// assert!(controller.is_grounded());
/// assert!(body.velocity.x > 0.0);
/// assert_eq!(body.gravity_scale, 0.0);
/// ```
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct LocomotionController {
    // === Sensor ===
    grounded: bool,
    ground_normal: Vec2,
    current_support: Option<Entity>,
    ground_distance: Option<f32>,

    // === Integrator ===
    accumulated_speed: f32,

    // === Intent ===
    intent: LocomotionIntent,

    // === Published ===
    velocity: Vec2,
    velocity_relative_to_elevator: Vec2,

    // === Body ===
    default_gravity_scale: f32,
    initialized: bool,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self {
            grounded: false,
            ground_normal: Vec2::ZERO,
            current_support: None,
            ground_distance: None,
            accumulated_speed: 0.0,
            intent: LocomotionIntent::default(),
            velocity: Vec2::ZERO,
            velocity_relative_to_elevator: Vec2::ZERO,
            default_gravity_scale: 1.0,
            initialized: false,
        }
    }
}

impl LocomotionController {
    /// Create an uninitialized controller, to be spawned as a component.
    ///
    /// The plugin initializes it on the first fixed step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller for an actor that already has its body and shape.
    pub fn try_new(
        entity: Entity,
        config: &LocomotionConfig,
        body: Option<BodyState>,
        shape: Option<ShapeBounds>,
    ) -> Result<Self, LocomotionError> {
        let mut controller = Self::new();
        controller.initialize(entity, config, body, shape)?;
        Ok(controller)
    }

    /// Validate the actor's dependencies and capture its default gravity scale.
    pub fn initialize(
        &mut self,
        entity: Entity,
        config: &LocomotionConfig,
        body: Option<BodyState>,
        shape: Option<ShapeBounds>,
    ) -> Result<(), LocomotionError> {
        config.validate()?;
        let body = body.ok_or(LocomotionError::MissingBody(entity))?;
        let shape = shape.ok_or(LocomotionError::MissingShape(entity))?;
        if !(shape.probe_radius() > 0.0) {
            return Err(LocomotionError::ShapeTooNarrow {
                entity,
                width: shape.size.x,
            });
        }

        self.default_gravity_scale = body.gravity_scale;
        self.velocity = body.velocity;
        self.velocity_relative_to_elevator = body.velocity;
        self.initialized = true;
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run one full fixed step: sense the ground, then [`step`](Self::step).
    pub fn tick<P, E>(
        &mut self,
        config: &LocomotionConfig,
        bounds: ShapeBounds,
        body: &mut BodyState,
        probe: &P,
        elevators: &E,
        dt: f32,
    ) where
        P: GroundProbe + ?Sized,
        E: ElevatorLookup + ?Sized,
    {
        let reading = sense_ground(probe, bounds, config.walkable_mask, config.max_slope_angle);
        self.apply_ground_reading(reading);
        self.step(config, body, elevators, dt);
    }

    /// Drop the previous ground reading. Until the sensor reports again, the actor
    /// counts as airborne with no support.
    pub fn clear_ground_reading(&mut self) {
        self.apply_ground_reading(GroundReading::default());
    }

    /// Record the result of this tick's ground probe.
    ///
    /// Backends that run their own probe call this in place of the sensing half
    /// of [`tick`](Self::tick).
    pub fn apply_ground_reading(&mut self, reading: GroundReading) {
        self.grounded = reading.grounded;
        self.ground_normal = reading.normal;
        self.current_support = reading.support;
        self.ground_distance = reading.distance;
    }

    /// Run everything after the ground sensor: gravity scale, integrator, jump
    /// latch, elevator coupling. Publishes the resulting velocities.
    pub fn step<E: ElevatorLookup + ?Sized>(
        &mut self,
        config: &LocomotionConfig,
        body: &mut BodyState,
        elevators: &E,
        dt: f32,
    ) {
        body.gravity_scale = if self.grounded {
            0.0
        } else {
            self.default_gravity_scale
        };

        let mut velocity = if self.grounded {
            let pursuit = Pursuit::new(
                self.intent.walk,
                config.max_speed,
                config.ground_acceleration,
                dt,
            );
            integrate_grounded(
                &mut self.accumulated_speed,
                body.velocity,
                self.ground_normal,
                pursuit,
            )
        } else {
            let pursuit = Pursuit::new(
                self.intent.walk,
                config.max_speed,
                config.air_acceleration,
                dt,
            );
            integrate_airborne(&mut self.accumulated_speed, body.velocity, pursuit)
        };

        if let Some(jump_velocity) = self.intent.jump.resolve(self.grounded, config.jump_impulse) {
            velocity.y = jump_velocity;
        }

        let coupled = couple_to_support(velocity, self.current_support, elevators);
        body.velocity = coupled.velocity;

        self.velocity = coupled.velocity;
        self.velocity_relative_to_elevator = coupled.relative;
    }

    /// Set the horizontal move intent for the next tick.
    pub fn set_move(&mut self, intent: f32) {
        self.intent.set_walk(intent);
    }

    /// Arm the jump latch.
    pub fn jump(&mut self) {
        self.intent.request_jump();
    }

    /// Whether the last tick found walkable ground.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Velocity written to the body by the last tick.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Velocity relative to the supporting elevator after the last tick.
    pub fn velocity_relative_to_elevator(&self) -> Vec2 {
        self.velocity_relative_to_elevator
    }

    /// Ground normal of the last tick, only while grounded.
    pub fn ground_normal(&self) -> Option<Vec2> {
        self.grounded.then_some(self.ground_normal)
    }

    /// How far the sensor circle travelled last tick before touching a surface.
    /// `None` if nothing was in reach.
    pub fn ground_distance(&self) -> Option<f32> {
        self.ground_distance
    }

    /// Entity under the actor during the last tick, walkable or not.
    pub fn current_support(&self) -> Option<Entity> {
        self.current_support
    }

    /// Integrator memory: signed speed along the ground (or world x in the air).
    pub fn accumulated_speed(&self) -> f32 {
        self.accumulated_speed
    }

    /// Current horizontal move intent.
    pub fn move_intent(&self) -> f32 {
        self.intent.walk
    }

    /// Whether a jump is waiting for the next tick.
    pub fn jump_pending(&self) -> bool {
        self.intent.jump.is_pending()
    }

    /// Gravity scale restored whenever the actor is airborne.
    pub fn default_gravity_scale(&self) -> f32 {
        self.default_gravity_scale
    }
}

impl CharacterController2d for LocomotionController {
    fn is_grounded(&self) -> bool {
        LocomotionController::is_grounded(self)
    }

    fn velocity(&self) -> Vec2 {
        LocomotionController::velocity(self)
    }

    fn velocity_relative_to_elevator(&self) -> Vec2 {
        LocomotionController::velocity_relative_to_elevator(self)
    }

    fn jump(&mut self) {
        LocomotionController::jump(self);
    }

    fn set_move(&mut self, intent: f32) {
        LocomotionController::set_move(self, intent);
    }
}
