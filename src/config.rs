//! Controller configuration component.
//!
//! All tuning for an actor lives in one immutable [`LocomotionConfig`] that is
//! supplied when the actor is spawned.

use bevy::prelude::*;

use crate::error::ConfigError;
use crate::sensor::PROBE_SLACK;

/// Configuration parameters for the locomotion controller.
///
/// Speeds are in world units per second, accelerations in world units per
/// second squared. The slope limit is in degrees, measured between the ground
/// normal and world up.
///
/// # Example
///
/// ```rust
/// use platform_locomotion::prelude::*;
///
/// let config = LocomotionConfig::player()
///     .with_max_speed(7.5)
///     .with_max_slope_angle(50.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct LocomotionConfig {
    // === Jump Settings ===
    /// Vertical velocity set (not added) when a jump is consumed on the ground.
    ///
    /// `jump_impulse * dt` must exceed the probe slack (0.2 units), or the
    /// next probe still reaches the ground and flattens the jump. Zero
    /// disables jumping. See [`LocomotionConfig::validate_for_timestep`].
    pub jump_impulse: f32,

    // === Movement Settings ===
    /// Horizontal speed reached at full move intent.
    pub max_speed: f32,

    /// Rate at which the along-ground speed pursues its target while grounded.
    pub ground_acceleration: f32,

    /// Rate at which the horizontal speed pursues its target while airborne.
    pub air_acceleration: f32,

    // === Slope Settings ===
    /// Steepest surface, in degrees from world up, that still counts as ground.
    pub max_slope_angle: f32,

    // === Sensor Settings ===
    /// Collision filter bits a surface must belong to for the ground probe to see it.
    pub walkable_mask: u32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            jump_impulse: 15.0,
            max_speed: 5.0,
            ground_acceleration: 50.0,
            air_acceleration: 20.0,
            max_slope_angle: 45.0,
            walkable_mask: u32::MAX,
        }
    }
}

impl LocomotionConfig {
    /// Create a config optimized for responsive player control.
    pub fn player() -> Self {
        Self {
            jump_impulse: 16.0,
            max_speed: 6.0,
            ground_acceleration: 80.0,
            air_acceleration: 30.0,
            ..default()
        }
    }

    /// Create a config for slow, weighty actors.
    pub fn heavy() -> Self {
        Self {
            jump_impulse: 14.0,
            max_speed: 3.0,
            ground_acceleration: 15.0,
            air_acceleration: 5.0,
            max_slope_angle: 30.0,
            ..default()
        }
    }

    /// Check that every tuning value can drive the controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("jump_impulse", self.jump_impulse),
            ("max_speed", self.max_speed),
            ("ground_acceleration", self.ground_acceleration),
            ("air_acceleration", self.air_acceleration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(0.0..=180.0).contains(&self.max_slope_angle) {
            return Err(ConfigError::SlopeOutOfRange(self.max_slope_angle));
        }

        Ok(())
    }

    /// [`validate`](Self::validate), plus a check that a jump leaves the probe's
    /// reach within one fixed step of `dt` seconds.
    pub fn validate_for_timestep(&self, dt: f32) -> Result<(), ConfigError> {
        self.validate()?;

        let min = PROBE_SLACK / dt;
        if self.jump_impulse > 0.0 && self.jump_impulse <= min {
            return Err(ConfigError::JumpTooWeak {
                impulse: self.jump_impulse,
                min,
            });
        }

        Ok(())
    }

    /// Builder: set jump impulse.
    pub fn with_jump_impulse(mut self, impulse: f32) -> Self {
        self.jump_impulse = impulse;
        self
    }

    /// Builder: set max speed.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Builder: set ground and air acceleration.
    pub fn with_acceleration(mut self, ground: f32, air: f32) -> Self {
        self.ground_acceleration = ground;
        self.air_acceleration = air;
        self
    }

    /// Builder: set ground acceleration.
    pub fn with_ground_acceleration(mut self, acceleration: f32) -> Self {
        self.ground_acceleration = acceleration;
        self
    }

    /// Builder: set air acceleration.
    pub fn with_air_acceleration(mut self, acceleration: f32) -> Self {
        self.air_acceleration = acceleration;
        self
    }

    /// Builder: set the walkable slope limit (degrees).
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle = degrees;
        self
    }

    /// Builder: set the collision filter used by the ground probe.
    pub fn with_walkable_mask(mut self, mask: u32) -> Self {
        self.walkable_mask = mask;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LocomotionConfig::default().validate().is_ok());
        assert!(LocomotionConfig::player().validate().is_ok());
        assert!(LocomotionConfig::heavy().validate().is_ok());
    }

    #[test]
    fn player_preset_is_snappier_than_default() {
        let player = LocomotionConfig::player();
        let default = LocomotionConfig::default();
        assert!(player.ground_acceleration >= default.ground_acceleration);
        assert!(player.jump_impulse >= default.jump_impulse);
    }

    #[test]
    fn negative_acceleration_is_rejected() {
        let config = LocomotionConfig::default().with_ground_acceleration(-1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "ground_acceleration",
                value: -1.0
            })
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let config = LocomotionConfig::default().with_max_speed(f32::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "max_speed",
                ..
            })
        ));

        let config = LocomotionConfig::default().with_jump_impulse(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn slope_limit_must_be_an_angle() {
        let config = LocomotionConfig::default().with_max_slope_angle(181.0);
        assert_eq!(config.validate(), Err(ConfigError::SlopeOutOfRange(181.0)));

        let config = LocomotionConfig::default().with_max_slope_angle(f32::NAN);
        assert!(config.validate().is_err());

        let config = LocomotionConfig::default().with_max_slope_angle(0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn presets_jump_clear_of_the_ground_slack_at_common_rates() {
        for dt in [1.0 / 50.0, 1.0 / 60.0, 1.0 / 64.0] {
            for config in [
                LocomotionConfig::default(),
                LocomotionConfig::player(),
                LocomotionConfig::heavy(),
            ] {
                assert!(
                    config.validate_for_timestep(dt).is_ok(),
                    "{config:?} at dt={dt}"
                );
            }
        }
    }

    #[test]
    fn weak_jump_is_rejected_for_the_timestep() {
        let config = LocomotionConfig::default().with_jump_impulse(10.0);
        assert!(matches!(
            config.validate_for_timestep(1.0 / 64.0),
            Err(ConfigError::JumpTooWeak { impulse, .. }) if impulse == 10.0
        ));

        // Fine at a coarser step
        assert!(config.validate_for_timestep(1.0 / 30.0).is_ok());

        // No jump at all is allowed
        let config = LocomotionConfig::default().with_jump_impulse(0.0);
        assert!(config.validate_for_timestep(1.0 / 64.0).is_ok());
    }

    #[test]
    fn timestep_check_still_validates_fields() {
        let config = LocomotionConfig::default().with_max_speed(-2.0);
        assert!(matches!(
            config.validate_for_timestep(1.0 / 64.0),
            Err(ConfigError::Negative { field: "max_speed", .. })
        ));
    }

    #[test]
    fn builders_set_fields() {
        let config = LocomotionConfig::default()
            .with_acceleration(40.0, 10.0)
            .with_walkable_mask(0b0100);
        assert_eq!(config.ground_acceleration, 40.0);
        assert_eq!(config.air_acceleration, 10.0);
        assert_eq!(config.walkable_mask, 0b0100);
    }
}
