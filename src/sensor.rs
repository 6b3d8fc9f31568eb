//! Ground sensing.
//!
//! One downward circle probe from the actor's collision shape decides whether
//! the actor is grounded, which surface normal it stands on, and which entity
//! supports it.

use bevy::prelude::*;

use crate::collision::CollisionData;

/// Margin shaved off the probe radius so it does not catch adjacent walls.
pub const PROBE_SKIN: f32 = 0.1;

/// Extra reach past the bottom of the shape.
pub const PROBE_SLACK: f32 = 0.2;

/// World-space bounding box of the actor's collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeBounds {
    /// Center of the box.
    pub center: Vec2,
    /// Full width and height of the box.
    pub size: Vec2,
}

impl ShapeBounds {
    /// Create bounds from a center and full size.
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Create bounds from opposite corners.
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    /// Half of the size.
    #[inline]
    pub fn extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Radius of the ground probe circle for this shape.
    #[inline]
    pub fn probe_radius(&self) -> f32 {
        self.extents().x - PROBE_SKIN
    }
}

/// A circle cast request issued by the ground sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRequest {
    /// Center of the circle at the start of the cast.
    pub origin: Vec2,
    /// Circle radius.
    pub radius: f32,
    /// Cast direction (normalized).
    pub direction: Vec2,
    /// Maximum travel distance.
    pub max_distance: f32,
    /// Collision filter bits a surface must match.
    pub mask: u32,
}

impl ProbeRequest {
    /// Build the downward probe for a shape.
    ///
    /// The circle starts at the shape center and travels just far enough for its
    /// bottom to pass the shape's bottom edge by [`PROBE_SLACK`].
    pub fn downward(bounds: ShapeBounds, mask: u32) -> Self {
        let radius = bounds.probe_radius();
        Self {
            origin: bounds.center,
            radius,
            direction: Vec2::NEG_Y,
            max_distance: bounds.extents().y - radius + PROBE_SLACK,
            mask,
        }
    }
}

/// Physics probe provider.
///
/// Answers a [`ProbeRequest`] with the nearest contact, or `None`. Backends
/// implement this on top of their query pipeline. Closures work too, which is
/// handy for driving the controller without a physics engine.
pub trait GroundProbe {
    /// Cast the circle and return the nearest contact.
    fn probe(&self, request: &ProbeRequest) -> Option<CollisionData>;
}

impl<F> GroundProbe for F
where
    F: Fn(&ProbeRequest) -> Option<CollisionData>,
{
    fn probe(&self, request: &ProbeRequest) -> Option<CollisionData> {
        self(request)
    }
}

/// Outcome of one ground probe.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundReading {
    /// Whether a shallow-enough surface is under the actor.
    pub grounded: bool,
    /// Normal of the contact, `Vec2::ZERO` on a miss.
    pub normal: Vec2,
    /// Entity owning the contact, whether or not it was walkable.
    pub support: Option<Entity>,
    /// Travel of the sensor circle before touching, `None` on a miss.
    pub distance: Option<f32>,
}

/// Unsigned angle between a surface normal and world up, in degrees.
///
/// A degenerate (zero-length) normal measures 0.
pub fn slope_angle_degrees(normal: Vec2) -> f32 {
    let length = normal.length();
    if length < 1e-15 {
        return 0.0;
    }
    let cos = (normal.dot(Vec2::Y) / length).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Classify a probe result against the slope limit.
pub fn classify_contact(hit: Option<CollisionData>, max_slope_angle: f32) -> GroundReading {
    match hit {
        Some(hit) => GroundReading {
            grounded: slope_angle_degrees(hit.normal) <= max_slope_angle,
            normal: hit.normal,
            support: hit.entity,
            distance: Some(hit.distance),
        },
        None => GroundReading::default(),
    }
}

/// Probe under a shape and classify the result.
pub fn sense_ground<P: GroundProbe + ?Sized>(
    probe: &P,
    bounds: ShapeBounds,
    mask: u32,
    max_slope_angle: f32,
) -> GroundReading {
    let request = ProbeRequest::downward(bounds, mask);
    classify_contact(probe.probe(&request), max_slope_angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_at(degrees: f32) -> Vec2 {
        let radians = degrees.to_radians();
        Vec2::new(-radians.sin(), radians.cos())
    }

    #[test]
    fn probe_geometry_from_bounds() {
        // 1 wide, 2 tall capsule centered at (3, 4)
        let bounds = ShapeBounds::new(Vec2::new(3.0, 4.0), Vec2::new(1.0, 2.0));
        let request = ProbeRequest::downward(bounds, 0b1);

        assert_eq!(request.origin, Vec2::new(3.0, 4.0));
        assert!((request.radius - 0.4).abs() < 1e-6);
        assert_eq!(request.direction, Vec2::NEG_Y);
        // extents.y - radius + slack = 1.0 - 0.4 + 0.2
        assert!((request.max_distance - 0.8).abs() < 1e-6);
        assert_eq!(request.mask, 0b1);
    }

    #[test]
    fn probe_reaches_past_the_bottom_edge() {
        let bounds = ShapeBounds::new(Vec2::ZERO, Vec2::new(0.5, 1.5));
        let request = ProbeRequest::downward(bounds, u32::MAX);

        let lowest = request.origin.y - request.max_distance - request.radius;
        let bottom = bounds.center.y - bounds.extents().y;
        assert!((bottom - lowest - PROBE_SLACK).abs() < 1e-6);
    }

    #[test]
    fn bounds_from_corners() {
        let bounds = ShapeBounds::from_min_max(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 3.0));
        assert_eq!(bounds.center, Vec2::new(0.0, 1.5));
        assert_eq!(bounds.size, Vec2::new(2.0, 3.0));
        assert_eq!(bounds.extents(), Vec2::new(1.0, 1.5));
    }

    #[test]
    fn slope_angle_of_common_normals() {
        assert!(slope_angle_degrees(Vec2::Y).abs() < 1e-4);
        assert!((slope_angle_degrees(Vec2::X) - 90.0).abs() < 1e-4);
        assert!((slope_angle_degrees(Vec2::NEG_Y) - 180.0).abs() < 1e-4);
        assert!((slope_angle_degrees(normal_at(30.0)) - 30.0).abs() < 1e-3);
        assert!((slope_angle_degrees(normal_at(-30.0)) - 30.0).abs() < 1e-3);
        // Not normalized
        assert!((slope_angle_degrees(Vec2::new(0.0, 5.0))).abs() < 1e-4);
        assert_eq!(slope_angle_degrees(Vec2::ZERO), 0.0);
    }

    #[test]
    fn miss_is_not_grounded() {
        let reading = classify_contact(None, 45.0);
        assert!(!reading.grounded);
        assert!(reading.support.is_none());
        assert!(reading.distance.is_none());
    }

    #[test]
    fn reading_carries_hit_distance() {
        let hit = CollisionData::new(0.35, normal_at(60.0), None);
        let reading = classify_contact(Some(hit), 45.0);

        assert!(!reading.grounded);
        assert_eq!(reading.distance, Some(0.35));
    }

    #[test]
    fn shallow_contact_is_grounded() {
        let entity = Entity::from_raw(3);
        let hit = CollisionData::contact(normal_at(20.0), Some(entity));
        let reading = classify_contact(Some(hit), 45.0);

        assert!(reading.grounded);
        assert_eq!(reading.normal, hit.normal);
        assert_eq!(reading.support, Some(entity));
    }

    #[test]
    fn contact_at_the_limit_is_grounded() {
        let reading = classify_contact(Some(CollisionData::contact(Vec2::Y, None)), 0.0);
        assert!(reading.grounded);
    }

    #[test]
    fn steep_contact_is_not_grounded_but_still_supports() {
        let entity = Entity::from_raw(9);
        let hit = CollisionData::contact(normal_at(50.0), Some(entity));
        let reading = classify_contact(Some(hit), 45.0);

        assert!(!reading.grounded);
        assert_eq!(reading.support, Some(entity));
    }

    #[test]
    fn sense_ground_issues_one_downward_probe() {
        let calls = std::cell::Cell::new(0);
        let probe = |request: &ProbeRequest| {
            calls.set(calls.get() + 1);
            assert_eq!(request.direction, Vec2::NEG_Y);
            assert_eq!(request.mask, 0b10);
            Some(CollisionData::contact(Vec2::Y, None))
        };
        let bounds = ShapeBounds::new(Vec2::ZERO, Vec2::new(1.0, 2.0));

        let reading = sense_ground(&probe, bounds, 0b10, 45.0);

        assert!(reading.grounded);
        assert_eq!(calls.get(), 1);
    }
}
