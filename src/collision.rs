//! Probe hit data.
//!
//! The result of a downward ground probe, as reported by a physics backend.

use bevy::prelude::*;

/// Information about a shapecast collision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance travelled by the cast shape before touching the surface.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec2,
    /// Entity owning the surface that was hit (if known).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            entity,
        }
    }

    /// A contact with only a normal and an owner, for probes that report nothing else.
    pub fn contact(normal: Vec2, entity: Option<Entity>) -> Self {
        Self {
            normal,
            entity,
            ..default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_data_new() {
        let hit = CollisionData::new(0.4, Vec2::Y, None);

        assert_eq!(hit.distance, 0.4);
        assert_eq!(hit.normal, Vec2::Y);
        assert!(hit.entity.is_none());
    }

    #[test]
    fn collision_data_contact_keeps_owner() {
        let entity = Entity::from_raw(42);
        let hit = CollisionData::contact(Vec2::X, Some(entity));

        assert_eq!(hit.entity, Some(entity));
        assert_eq!(hit.normal, Vec2::X);
        assert_eq!(hit.distance, 0.0);
    }
}
