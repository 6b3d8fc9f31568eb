//! Configuration errors.
//!
//! The controller has no runtime failure modes. Everything here is raised while
//! an actor is being set up and is meant to stop the game loudly.

use bevy::prelude::*;
use thiserror::Error;

/// A tuning value that cannot drive the controller.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("`{field}` must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`max_slope_angle` must be within 0..=180 degrees, got {0}")]
    SlopeOutOfRange(f32),

    #[error("`jump_impulse` {impulse} cannot clear the ground probe at this fixed step, need more than {min}")]
    JumpTooWeak { impulse: f32, min: f32 },
}

/// Failure to bring a locomotion controller up on an actor.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LocomotionError {
    #[error("entity {0} has a locomotion controller but no physics body")]
    MissingBody(Entity),

    #[error("entity {0} has a locomotion controller but no collision shape")]
    MissingShape(Entity),

    #[error("collision shape of entity {entity} is too narrow for a ground probe (width {width})")]
    ShapeTooNarrow { entity: Entity, width: f32 },

    #[error("invalid locomotion config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_locomotion_error() {
        let err: LocomotionError = ConfigError::SlopeOutOfRange(200.0).into();
        assert_eq!(
            err,
            LocomotionError::InvalidConfig(ConfigError::SlopeOutOfRange(200.0))
        );
    }

    #[test]
    fn messages_name_the_problem() {
        let err = ConfigError::Negative {
            field: "max_speed",
            value: -1.0,
        };
        assert!(err.to_string().contains("max_speed"));

        let err = LocomotionError::MissingShape(Entity::from_raw(7));
        assert!(err.to_string().contains("no collision shape"));
    }
}
