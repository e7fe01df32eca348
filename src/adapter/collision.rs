//! Ball collision against planar colliders
//!
//! The headless world works on the arena plane only: the ball is a circle and
//! every static collider is reduced to one or more boxes rotated about Z.

use glam::{Vec2, Vec3};

use super::physics::ShapeSpec;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Closest point on the collider
    pub point: Vec2,
    /// Surface normal pointing toward the ball centre
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

/// Box on the arena plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarBox {
    pub center: Vec2,
    pub half: Vec2,
    /// Rotation about Z (radians)
    pub rotation: f32,
}

impl PlanarBox {
    pub fn new(center: Vec2, half: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half,
            rotation,
        }
    }
}

/// Reduce a collider shape at `position` to planar boxes
pub fn planar_boxes(shape: &ShapeSpec, position: Vec3) -> Vec<PlanarBox> {
    let origin = position.truncate();
    match *shape {
        ShapeSpec::Box {
            half_extents,
            rotation_z,
        } => vec![PlanarBox::new(origin, half_extents.truncate(), rotation_z)],
        ShapeSpec::Cylinder {
            radius,
            half_height,
        } => vec![PlanarBox::new(origin, Vec2::new(radius, half_height), 0.0)],
        // Bounding square
        ShapeSpec::Sphere { radius } => vec![PlanarBox::new(origin, Vec2::splat(radius), 0.0)],
        ShapeSpec::Bowl {
            top_radius,
            bottom_radius,
            height,
        } => bowl_boxes(origin, top_radius, bottom_radius, height),
    }
}

/// Cross-section of the cup: a bottom slab and two slanted sides
fn bowl_boxes(origin: Vec2, top: f32, bottom: f32, height: f32) -> Vec<PlanarBox> {
    const WALL_HALF_THICKNESS: f32 = 0.075;
    const BASE_HALF_THICKNESS: f32 = 0.1;

    let flare = top - bottom;
    let side_half_len = (flare * flare + height * height).sqrt() / 2.0;
    let side_x = (top + bottom) / 2.0;
    let right_angle = height.atan2(flare);
    let left_angle = height.atan2(-flare);

    vec![
        PlanarBox::new(
            origin + Vec2::new(0.0, -height / 2.0 + BASE_HALF_THICKNESS),
            Vec2::new(bottom, BASE_HALF_THICKNESS),
            0.0,
        ),
        PlanarBox::new(
            origin + Vec2::new(side_x, 0.0),
            Vec2::new(side_half_len, WALL_HALF_THICKNESS),
            right_angle,
        ),
        PlanarBox::new(
            origin + Vec2::new(-side_x, 0.0),
            Vec2::new(side_half_len, WALL_HALF_THICKNESS),
            left_angle,
        ),
    ]
}

/// Check collision between a ball and a rotated box
pub fn ball_box_collision(ball_pos: Vec2, ball_radius: f32, b: &PlanarBox) -> Option<CollisionResult> {
    let to_local = Vec2::from_angle(-b.rotation);
    let to_world = Vec2::from_angle(b.rotation);

    let local = to_local.rotate(ball_pos - b.center);
    let closest = local.clamp(-b.half, b.half);
    let diff = local - closest;
    let dist_sq = diff.length_squared();
    if dist_sq >= ball_radius * ball_radius {
        return None;
    }

    let (normal, penetration) = if dist_sq > 1e-8 {
        let dist = dist_sq.sqrt();
        (diff / dist, ball_radius - dist)
    } else {
        // Centre inside the box: push out along the shallowest axis
        let dx = b.half.x - local.x.abs();
        let dy = b.half.y - local.y.abs();
        if dx < dy {
            (Vec2::new(local.x.signum(), 0.0), dx + ball_radius)
        } else {
            (Vec2::new(0.0, local.y.signum()), dy + ball_radius)
        }
    };

    Some(CollisionResult {
        point: b.center + to_world.rotate(closest),
        normal: to_world.rotate(normal),
        penetration,
    })
}

/// Reflect the normal component of `velocity`, scaled by `restitution`.
///
/// Velocities already separating are returned unchanged.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * vn * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_ball_resting_on_box_top() {
        let b = PlanarBox::new(Vec2::ZERO, Vec2::new(2.0, 0.5), 0.0);
        let hit = ball_box_collision(Vec2::new(0.5, 0.9), 0.5, &b).unwrap();
        assert!((hit.normal - Vec2::Y).length() < 1e-5);
        assert!((hit.penetration - 0.1).abs() < 1e-5);
        assert!(ball_box_collision(Vec2::new(0.5, 1.1), 0.5, &b).is_none());
    }

    #[test]
    fn test_rotated_box() {
        // Quarter turn: the long axis now runs along Y
        let b = PlanarBox::new(Vec2::ZERO, Vec2::new(2.0, 0.25), FRAC_PI_2);
        let hit = ball_box_collision(Vec2::new(0.6, 1.5), 0.5, &b).unwrap();
        assert!((hit.normal - Vec2::X).length() < 1e-4);
        assert!(ball_box_collision(Vec2::new(0.0, 3.0), 0.5, &b).is_none());
    }

    #[test]
    fn test_centre_inside_pushes_along_shallow_axis() {
        let b = PlanarBox::new(Vec2::ZERO, Vec2::new(3.0, 0.5), 0.0);
        let hit = ball_box_collision(Vec2::new(1.0, 0.25), 0.5, &b).unwrap();
        assert_eq!(hit.normal, Vec2::Y);
        assert!((hit.penetration - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_reflect_velocity() {
        let v = reflect_velocity(Vec2::new(1.0, -10.0), Vec2::Y, 0.4);
        assert!((v - Vec2::new(1.0, 4.0)).length() < 1e-5);
        // Separating velocity untouched
        assert_eq!(reflect_velocity(Vec2::new(0.0, 2.0), Vec2::Y, 0.4), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_bowl_catches_ball() {
        let boxes = planar_boxes(
            &ShapeSpec::Bowl {
                top_radius: 2.5,
                bottom_radius: 1.5,
                height: 1.5,
            },
            Vec3::new(0.0, -11.0, 0.0),
        );
        assert_eq!(boxes.len(), 3);
        // Dropping straight in lands on the base
        let hit = boxes
            .iter()
            .find_map(|b| ball_box_collision(Vec2::new(0.0, -11.1), 0.5, b))
            .unwrap();
        assert!(hit.normal.y > 0.99);
    }
}
