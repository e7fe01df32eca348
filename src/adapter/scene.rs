//! Document-to-adapter bindings
//!
//! Keeps one body and one visual per document entity and applies editor
//! [`SceneChange`]s. Shapes and visual parameters come from a single
//! per-variant table so every entity kind is handled in one place.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::physics::{BodyHandle, BodyKind, KinematicMode, PhysicsAdapter, ShapeSpec};
use super::render::{RendererAdapter, VisualHandle, VisualKind, VisualParams};
use crate::consts::{BALL_RADIUS, GROUND_HALF_EXTENT, GROUND_Y};
use crate::editor::{PreviewShape, SceneChange};
use crate::level::{EntityKind, EntityRef, LevelDocument};
use crate::sim::BallKinematics;

/// Body and visual backing one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityBinding {
    pub body: BodyHandle,
    pub visual: VisualHandle,
}

/// Collider, placement and body kind for an entity
fn body_spec(doc: &LevelDocument, entity: EntityRef) -> Option<(ShapeSpec, Vec3, BodyKind)> {
    let id = entity.id;
    let spec = match entity.kind {
        EntityKind::Star => {
            let s = doc.stars.iter().find(|s| s.id == id)?;
            (ShapeSpec::Sphere { radius: 0.6 }, s.position, BodyKind::Trigger)
        }
        EntityKind::Wall => {
            let w = doc.walls.iter().find(|w| w.id == id)?;
            (
                ShapeSpec::Box {
                    half_extents: Vec3::new(w.length() / 2.0, 0.25, 1.0),
                    rotation_z: w.angle(),
                },
                w.center(),
                BodyKind::Static,
            )
        }
        EntityKind::Booster => {
            let b = doc.boosters.iter().find(|b| b.id == id)?;
            (
                ShapeSpec::Box {
                    half_extents: Vec3::new(b.length() / 2.0, 0.05, 1.0),
                    rotation_z: b.angle(),
                },
                b.center(),
                BodyKind::Trigger,
            )
        }
        EntityKind::Spike => {
            let s = doc.spikes.iter().find(|s| s.id == id)?;
            (
                ShapeSpec::Cylinder {
                    radius: 0.5,
                    half_height: 0.5,
                },
                s.position,
                BodyKind::Trigger,
            )
        }
        EntityKind::Portal => {
            let p = doc.portal(id)?;
            (
                ShapeSpec::Cylinder {
                    radius: 0.8,
                    half_height: 0.1,
                },
                p.position,
                BodyKind::Trigger,
            )
        }
        EntityKind::Ramp => {
            let r = doc.ramps.iter().find(|r| r.id == id)?;
            (
                ShapeSpec::Box {
                    half_extents: Vec3::new(r.length / 2.0, 0.1, 1.0),
                    rotation_z: r.rotation_z,
                },
                r.position,
                BodyKind::Static,
            )
        }
        EntityKind::Bowl => (
            ShapeSpec::Bowl {
                top_radius: 2.5,
                bottom_radius: 1.5,
                height: 1.5,
            },
            doc.bowl,
            BodyKind::Static,
        ),
    };
    Some(spec)
}

fn visual_params(doc: &LevelDocument, entity: EntityRef) -> Option<VisualParams> {
    let id = entity.id;
    let params = match entity.kind {
        EntityKind::Star => VisualParams::at(doc.stars.iter().find(|s| s.id == id)?.position),
        EntityKind::Wall => {
            let w = doc.walls.iter().find(|w| w.id == id)?;
            VisualParams::segment(w.center(), w.angle(), w.length())
        }
        EntityKind::Booster => {
            let b = doc.boosters.iter().find(|b| b.id == id)?;
            VisualParams::segment(b.center(), b.angle(), b.length())
        }
        EntityKind::Spike => VisualParams::at(doc.spikes.iter().find(|s| s.id == id)?.position),
        EntityKind::Portal => VisualParams::at(doc.portal(id)?.position),
        EntityKind::Ramp => {
            let r = doc.ramps.iter().find(|r| r.id == id)?;
            VisualParams::segment(r.position, r.rotation_z, r.length)
        }
        EntityKind::Bowl => VisualParams::at(doc.bowl),
    };
    Some(params)
}

fn preview_params(shape: &PreviewShape) -> VisualParams {
    VisualParams::segment(shape.center(), shape.angle(), shape.length()).translucent()
}

#[derive(Debug, Clone, Default)]
pub struct SceneBindings {
    entities: BTreeMap<EntityRef, EntityBinding>,
    ground: Option<EntityBinding>,
    ball: Option<EntityBinding>,
    highlighted: Option<EntityRef>,
    pending_portal: Option<VisualHandle>,
    preview: Option<VisualHandle>,
}

impl SceneBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self, entity: EntityRef) -> Option<EntityBinding> {
        self.entities.get(&entity).copied()
    }

    pub fn ball(&self) -> Option<EntityBinding> {
        self.ball
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Tear everything down and build bodies and visuals for the whole document
    pub fn spawn_document<P: PhysicsAdapter, R: RendererAdapter>(
        &mut self,
        doc: &LevelDocument,
        physics: &mut P,
        renderer: &mut R,
    ) {
        self.clear(physics, renderer);

        let ground_body = physics.create_body(
            ShapeSpec::Box {
                half_extents: Vec3::new(GROUND_HALF_EXTENT, 0.5, GROUND_HALF_EXTENT),
                rotation_z: 0.0,
            },
            Vec3::new(0.0, GROUND_Y - 0.5, 0.0),
            BodyKind::Static,
        );
        let ground_visual =
            renderer.create_visual(VisualKind::Ground, VisualParams::at(Vec3::new(0.0, GROUND_Y, 0.0)));
        self.ground = Some(EntityBinding {
            body: ground_body,
            visual: ground_visual,
        });

        self.spawn_entity(doc, EntityRef::bowl(), physics, renderer);
        for entity in doc.entity_refs() {
            self.spawn_entity(doc, entity, physics, renderer);
        }

        let ball_body = physics.create_body(
            ShapeSpec::Sphere {
                radius: BALL_RADIUS,
            },
            doc.ball_start,
            BodyKind::Dynamic,
        );
        physics.set_kinematic_mode(ball_body, KinematicMode::Static);
        let ball_visual = renderer.create_visual(VisualKind::Ball, VisualParams::at(doc.ball_start));
        self.ball = Some(EntityBinding {
            body: ball_body,
            visual: ball_visual,
        });

        log::debug!("Spawned scene with {} entities", self.entities.len());
    }

    /// Remove every body and visual this scene created
    pub fn clear<P: PhysicsAdapter, R: RendererAdapter>(&mut self, physics: &mut P, renderer: &mut R) {
        let bindings = std::mem::take(&mut self.entities)
            .into_values()
            .chain(self.ground.take())
            .chain(self.ball.take());
        for binding in bindings {
            physics.remove_body(binding.body);
            renderer.remove_visual(binding.visual);
        }
        for visual in [self.pending_portal.take(), self.preview.take()].into_iter().flatten() {
            renderer.remove_visual(visual);
        }
        self.highlighted = None;
    }

    pub fn spawn_entity<P: PhysicsAdapter, R: RendererAdapter>(
        &mut self,
        doc: &LevelDocument,
        entity: EntityRef,
        physics: &mut P,
        renderer: &mut R,
    ) {
        self.despawn_entity(entity, physics, renderer);
        let (Some((shape, position, kind)), Some(params)) =
            (body_spec(doc, entity), visual_params(doc, entity))
        else {
            log::warn!("Cannot spawn {:?} {}: not in the document", entity.kind, entity.id);
            return;
        };
        let body = physics.create_body(shape, position, kind);
        let visual = renderer.create_visual(VisualKind::Entity(entity.kind), params);
        self.entities.insert(entity, EntityBinding { body, visual });
    }

    pub fn despawn_entity<P: PhysicsAdapter, R: RendererAdapter>(
        &mut self,
        entity: EntityRef,
        physics: &mut P,
        renderer: &mut R,
    ) {
        if let Some(binding) = self.entities.remove(&entity) {
            physics.remove_body(binding.body);
            renderer.remove_visual(binding.visual);
        }
        if self.highlighted == Some(entity) {
            self.highlighted = None;
        }
    }

    /// Push an entity's current document transform to its body and visual
    pub fn sync_entity<P: PhysicsAdapter, R: RendererAdapter>(
        &mut self,
        doc: &LevelDocument,
        entity: EntityRef,
        physics: &mut P,
        renderer: &mut R,
    ) {
        let Some(binding) = self.binding(entity) else {
            self.spawn_entity(doc, entity, physics, renderer);
            return;
        };
        let (Some((_, position, _)), Some(params)) =
            (body_spec(doc, entity), visual_params(doc, entity))
        else {
            return;
        };
        physics.set_position(binding.body, position);
        renderer.update_transform(binding.visual, params.position, params.orientation);
    }

    /// Apply editor output in order
    pub fn apply<P: PhysicsAdapter, R: RendererAdapter>(
        &mut self,
        changes: Vec<SceneChange>,
        doc: &LevelDocument,
        physics: &mut P,
        renderer: &mut R,
    ) {
        for change in changes {
            match change {
                SceneChange::Spawned(entity) => self.spawn_entity(doc, entity, physics, renderer),
                SceneChange::Despawned(entity) => self.despawn_entity(entity, physics, renderer),
                SceneChange::Moved(entity) => self.sync_entity(doc, entity, physics, renderer),
                SceneChange::Highlight(entity) => self.set_highlight(entity, renderer),
                SceneChange::Preview(shape) => {
                    if let Some(old) = self.preview.take() {
                        renderer.remove_visual(old);
                    }
                    self.preview = shape.map(|s| {
                        renderer.create_visual(VisualKind::Preview(s.kind), preview_params(&s))
                    });
                }
                SceneChange::PendingPortal(position) => {
                    if let Some(old) = self.pending_portal.take() {
                        renderer.remove_visual(old);
                    }
                    self.pending_portal = position.map(|p| {
                        renderer.create_visual(VisualKind::PendingPortal, VisualParams::at(p).translucent())
                    });
                }
            }
        }
    }

    fn set_highlight<R: RendererAdapter>(&mut self, entity: Option<EntityRef>, renderer: &mut R) {
        if let Some(old) = self.highlighted.take().and_then(|e| self.binding(e)) {
            renderer.set_highlight(old.visual, false);
        }
        if let Some(binding) = entity.and_then(|e| self.binding(e)) {
            renderer.set_highlight(binding.visual, true);
            self.highlighted = entity;
        }
    }

    pub fn set_star_visible<R: RendererAdapter>(&self, id: u32, visible: bool, renderer: &mut R) {
        if let Some(binding) = self.binding(EntityRef::new(EntityKind::Star, id)) {
            renderer.set_visible(binding.visual, visible);
        }
    }

    /// Show every star again after a reset
    pub fn restore_stars<R: RendererAdapter>(&self, doc: &LevelDocument, renderer: &mut R) {
        for star in &doc.stars {
            self.set_star_visible(star.id, true, renderer);
        }
    }

    /// Ball kinematics as the physics world currently has them
    pub fn read_ball<P: PhysicsAdapter>(&self, physics: &P, current: &BallKinematics) -> BallKinematics {
        let Some(ball) = self.ball else {
            return *current;
        };
        BallKinematics {
            position: physics.position(ball.body).unwrap_or(current.position),
            velocity: physics.velocity(ball.body).unwrap_or(current.velocity),
            angular_velocity: physics
                .angular_velocity(ball.body)
                .unwrap_or(current.angular_velocity),
            dynamic: current.dynamic,
        }
    }

    /// Write rule corrections (teleport, boost, reset, launch) back to the ball body
    pub fn write_ball<P: PhysicsAdapter, R: RendererAdapter>(
        &self,
        ball: &BallKinematics,
        physics: &mut P,
        renderer: &mut R,
    ) {
        let Some(binding) = self.ball else {
            return;
        };
        physics.set_position(binding.body, ball.position);
        physics.set_velocity(binding.body, ball.velocity);
        physics.set_angular_velocity(binding.body, ball.angular_velocity);
        let mode = if ball.dynamic {
            KinematicMode::Dynamic
        } else {
            KinematicMode::Static
        };
        physics.set_kinematic_mode(binding.body, mode);
        renderer.update_transform(binding.visual, ball.position, Quat::IDENTITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::headless::{HeadlessPhysics, HeadlessRenderer};
    use crate::level::{EntitySpec, decode};

    fn scene_for(doc: &LevelDocument) -> (SceneBindings, HeadlessPhysics, HeadlessRenderer) {
        let mut scene = SceneBindings::new();
        let mut physics = HeadlessPhysics::new();
        let mut renderer = HeadlessRenderer::new();
        scene.spawn_document(doc, &mut physics, &mut renderer);
        (scene, physics, renderer)
    }

    #[test]
    fn test_spawn_document_binds_everything() {
        let doc = decode(
            "BALL:0,12,0\nBOWL:0,-11,0\nSTAR:1,1,0\nWALL:0,0,0,4,0,0\nPORTAL:0,5,0,5,5,0\nRAMP:2,2,0,0.5,3",
        );
        let (scene, physics, renderer) = scene_for(&doc);
        // star + wall + 2 portals + ramp + bowl
        assert_eq!(scene.entity_count(), 6);
        // plus ground and ball
        assert_eq!(physics.body_count(), 8);
        assert_eq!(renderer.len(), 8);
        assert_eq!(renderer.count(VisualKind::Entity(EntityKind::Portal)), 2);

        let ball = scene.ball().unwrap();
        assert_eq!(physics.mode(ball.body), Some(KinematicMode::Static));
    }

    #[test]
    fn test_respawn_replaces_previous_scene() {
        let doc = decode("STAR:1,1,0\nSTAR:2,2,0");
        let (mut scene, mut physics, mut renderer) = scene_for(&doc);
        scene.spawn_document(&doc, &mut physics, &mut renderer);
        assert_eq!(renderer.count(VisualKind::Entity(EntityKind::Star)), 2);
        assert_eq!(renderer.count(VisualKind::Ball), 1);
    }

    #[test]
    fn test_apply_editor_changes() {
        let mut doc = LevelDocument::new();
        let (mut scene, mut physics, mut renderer) = scene_for(&doc);

        let wall = doc.add_entity(EntitySpec::Wall {
            start: Vec3::ZERO,
            end: Vec3::new(2.0, 0.0, 0.0),
        });
        let preview = PreviewShape {
            kind: EntityKind::Wall,
            start: Vec3::ZERO,
            end: Vec3::X,
        };
        scene.apply(
            vec![
                SceneChange::Preview(Some(preview)),
                SceneChange::Preview(None),
                SceneChange::Spawned(wall),
                SceneChange::Highlight(Some(wall)),
                SceneChange::PendingPortal(Some(Vec3::Y)),
            ],
            &doc,
            &mut physics,
            &mut renderer,
        );
        let binding = scene.binding(wall).unwrap();
        assert_eq!(renderer.highlighted(), vec![binding.visual]);
        assert_eq!(renderer.count(VisualKind::Preview(EntityKind::Wall)), 0);
        assert_eq!(renderer.count(VisualKind::PendingPortal), 1);

        doc.translate_entity(wall, Vec3::new(0.0, 3.0, 0.0));
        scene.apply(vec![SceneChange::Moved(wall)], &doc, &mut physics, &mut renderer);
        assert_eq!(physics.position(binding.body), Some(Vec3::new(1.0, 3.0, 0.0)));

        doc.remove_entity(wall);
        scene.apply(vec![SceneChange::Despawned(wall)], &doc, &mut physics, &mut renderer);
        assert!(scene.binding(wall).is_none());
        assert!(renderer.highlighted().is_empty());
    }

    #[test]
    fn test_star_visibility() {
        let doc = decode("STAR:1,1,0");
        let (scene, _physics, mut renderer) = scene_for(&doc);
        let id = doc.stars[0].id;
        scene.set_star_visible(id, false, &mut renderer);
        assert_eq!(renderer.visible_count(VisualKind::Entity(EntityKind::Star)), 0);
        scene.restore_stars(&doc, &mut renderer);
        assert_eq!(renderer.visible_count(VisualKind::Entity(EntityKind::Star)), 1);
    }
}
