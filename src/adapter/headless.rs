//! In-memory adapters
//!
//! `HeadlessPhysics` integrates gravity for dynamic spheres and resolves
//! them against static colliders on the arena plane. `HeadlessRenderer`
//! only keeps bookkeeping, which is what tests and the native binary need.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::collision::{PlanarBox, ball_box_collision, planar_boxes, reflect_velocity};
use super::physics::{BodyHandle, BodyKind, Contact, KinematicMode, PhysicsAdapter, ShapeSpec};
use super::render::{RendererAdapter, VisualHandle, VisualKind, VisualParams};
use crate::consts::{BALL_ANGULAR_DAMPING, BALL_LINEAR_DAMPING, GRAVITY, MAX_SUBSTEPS, RESTITUTION};

#[derive(Debug, Clone)]
struct Body {
    shape: ShapeSpec,
    kind: BodyKind,
    mode: KinematicMode,
    position: Vec3,
    velocity: Vec3,
    angular_velocity: Vec3,
}

#[derive(Debug, Clone)]
pub struct HeadlessPhysics {
    bodies: BTreeMap<BodyHandle, Body>,
    next_id: u64,
    contacts: Vec<Contact>,
    pub gravity: Vec3,
}

impl Default for HeadlessPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPhysics {
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_id: 1,
            contacts: Vec::new(),
            gravity: Vec3::new(0.0, GRAVITY, 0.0),
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn kind(&self, handle: BodyHandle) -> Option<BodyKind> {
        self.bodies.get(&handle).map(|b| b.kind)
    }

    pub fn mode(&self, handle: BodyHandle) -> Option<KinematicMode> {
        self.bodies.get(&handle).map(|b| b.mode)
    }

    fn step_sphere(
        &mut self,
        handle: BodyHandle,
        radius: f32,
        colliders: &[(BodyHandle, PlanarBox)],
        dt: f32,
    ) {
        let Some(body) = self.bodies.get_mut(&handle) else {
            return;
        };

        let travel = body.velocity.length() * dt;
        let substeps = ((travel / (radius * 0.5)).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let step = dt / substeps as f32;
        let linear_keep = (1.0 - BALL_LINEAR_DAMPING).powf(step);
        let angular_keep = (1.0 - BALL_ANGULAR_DAMPING).powf(step);

        for _ in 0..substeps {
            body.velocity += self.gravity * step;
            body.velocity *= linear_keep;
            body.angular_velocity *= angular_keep;
            body.position += body.velocity * step;

            for (other, collider) in colliders {
                let Some(hit) = ball_box_collision(body.position.truncate(), radius, collider)
                else {
                    continue;
                };
                body.position += hit.normal.extend(0.0) * hit.penetration;

                let planar = body.velocity.truncate();
                let approach = -planar.dot(hit.normal);
                body.velocity = reflect_velocity(planar, hit.normal, RESTITUTION).extend(body.velocity.z);
                if approach > 0.0 {
                    // Rolling spin from the tangential speed
                    body.angular_velocity = Vec3::new(0.0, 0.0, -body.velocity.x / radius);
                    self.contacts.push(Contact {
                        body: handle,
                        other: *other,
                        impact_speed: approach,
                    });
                }
            }
        }
    }
}

impl PhysicsAdapter for HeadlessPhysics {
    fn create_body(&mut self, shape: ShapeSpec, position: Vec3, kind: BodyKind) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        let mode = match kind {
            BodyKind::Dynamic => KinematicMode::Dynamic,
            BodyKind::Static | BodyKind::Trigger => KinematicMode::Static,
        };
        self.bodies.insert(
            handle,
            Body {
                shape,
                kind,
                mode,
                position,
                velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
            },
        );
        log::trace!("Created {:?} body {:?}", kind, handle);
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.position)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.velocity)
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.angular_velocity)
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity = velocity;
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.angular_velocity = angular_velocity;
        }
    }

    fn set_kinematic_mode(&mut self, handle: BodyHandle, mode: KinematicMode) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.mode = mode;
        }
    }

    fn take_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }

    fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let colliders: Vec<(BodyHandle, PlanarBox)> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.kind == BodyKind::Static)
            .flat_map(|(h, b)| {
                planar_boxes(&b.shape, b.position)
                    .into_iter()
                    .map(move |pb| (*h, pb))
            })
            .collect();

        let movers: Vec<(BodyHandle, f32)> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.kind == BodyKind::Dynamic && b.mode == KinematicMode::Dynamic)
            .filter_map(|(h, b)| match b.shape {
                ShapeSpec::Sphere { radius } => Some((*h, radius)),
                _ => None,
            })
            .collect();

        for (handle, radius) in movers {
            self.step_sphere(handle, radius, &colliders, dt);
        }
    }
}

/// Bookkeeping for one visual
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRecord {
    pub kind: VisualKind,
    pub params: VisualParams,
    pub highlighted: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    visuals: BTreeMap<VisualHandle, VisualRecord>,
    next_id: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&VisualRecord> {
        self.visuals.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn count(&self, kind: VisualKind) -> usize {
        self.visuals.values().filter(|v| v.kind == kind).count()
    }

    pub fn visible_count(&self, kind: VisualKind) -> usize {
        self.visuals
            .values()
            .filter(|v| v.kind == kind && v.visible)
            .count()
    }

    pub fn highlighted(&self) -> Vec<VisualHandle> {
        self.visuals
            .iter()
            .filter(|(_, v)| v.highlighted)
            .map(|(h, _)| *h)
            .collect()
    }
}

impl RendererAdapter for HeadlessRenderer {
    fn create_visual(&mut self, kind: VisualKind, params: VisualParams) -> VisualHandle {
        self.next_id += 1;
        let handle = VisualHandle(self.next_id);
        self.visuals.insert(
            handle,
            VisualRecord {
                kind,
                params,
                highlighted: false,
                visible: true,
            },
        );
        handle
    }

    fn update_transform(&mut self, handle: VisualHandle, position: Vec3, orientation: Quat) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.params.position = position;
            v.params.orientation = orientation;
        }
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
    }

    fn set_highlight(&mut self, handle: VisualHandle, on: bool) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.highlighted = on;
        }
    }

    fn set_visible(&mut self, handle: VisualHandle, visible: bool) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BALL_RADIUS, GROUND_Y};

    fn world_with_floor() -> HeadlessPhysics {
        let mut physics = HeadlessPhysics::new();
        physics.create_body(
            ShapeSpec::Box {
                half_extents: Vec3::new(22.0, 0.5, 22.0),
                rotation_z: 0.0,
            },
            Vec3::new(0.0, GROUND_Y - 0.5, 0.0),
            BodyKind::Static,
        );
        physics
    }

    fn ball(physics: &mut HeadlessPhysics, at: Vec3) -> BodyHandle {
        physics.create_body(
            ShapeSpec::Sphere {
                radius: BALL_RADIUS,
            },
            at,
            BodyKind::Dynamic,
        )
    }

    #[test]
    fn test_ball_falls_and_settles_on_floor() {
        let mut physics = world_with_floor();
        let h = ball(&mut physics, Vec3::new(0.0, 0.0, 0.0));
        for _ in 0..600 {
            physics.advance(1.0 / 60.0);
        }
        let pos = physics.position(h).unwrap();
        assert!((pos.y - (GROUND_Y + BALL_RADIUS)).abs() < 0.05, "y = {}", pos.y);
        let contacts = physics.take_contacts();
        assert!(contacts.iter().any(|c| c.body == h && c.impact_speed > 2.0));
        assert!(physics.take_contacts().is_empty());
    }

    #[test]
    fn test_frozen_ball_does_not_move() {
        let mut physics = world_with_floor();
        let h = ball(&mut physics, Vec3::new(0.0, 5.0, 0.0));
        physics.set_kinematic_mode(h, KinematicMode::Static);
        physics.advance(0.5);
        assert_eq!(physics.position(h), Some(Vec3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_triggers_do_not_collide() {
        let mut physics = HeadlessPhysics::new();
        physics.create_body(
            ShapeSpec::Sphere { radius: 0.6 },
            Vec3::new(0.0, -1.0, 0.0),
            BodyKind::Trigger,
        );
        let h = ball(&mut physics, Vec3::ZERO);
        for _ in 0..30 {
            physics.advance(1.0 / 60.0);
        }
        assert!(physics.position(h).unwrap().y < -1.5);
        assert!(physics.take_contacts().is_empty());
    }

    #[test]
    fn test_renderer_bookkeeping() {
        let mut renderer = HeadlessRenderer::new();
        let a = renderer.create_visual(VisualKind::Ball, VisualParams::at(Vec3::ZERO));
        let b = renderer.create_visual(
            VisualKind::Preview(crate::level::EntityKind::Wall),
            VisualParams::segment(Vec3::ZERO, 0.0, 3.0).translucent(),
        );
        renderer.set_highlight(a, true);
        renderer.set_visible(b, false);
        renderer.update_transform(a, Vec3::X, Quat::IDENTITY);

        assert_eq!(renderer.highlighted(), vec![a]);
        assert_eq!(renderer.get(a).unwrap().params.position, Vec3::X);
        assert!(!renderer.get(b).unwrap().visible);
        renderer.remove_visual(b);
        assert_eq!(renderer.len(), 1);
    }
}
