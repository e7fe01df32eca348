//! In-memory level registry
//!
//! Holds every placed entity plus the ball start, the bowl and level
//! metadata. Portals only ever enter or leave the document as linked pairs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Booster, EntityKind, EntityRef, EntitySpec, Portal, Ramp, Spike, Star, Wall};
use crate::consts::{DEFAULT_BALL_START, DEFAULT_BOWL};
use crate::distance_to_segment;

/// Bowl pick radius (larger than the regular threshold)
pub const BOWL_PICK_RADIUS: f32 = 3.0;
/// The bowl wins over a closer match if within this margin of it
pub const BOWL_TIE_MARGIN: f32 = 1.5;

/// Next id per variant. Never rewound, so ids are not reused within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdCounters {
    star: u32,
    wall: u32,
    booster: u32,
    spike: u32,
    portal: u32,
    ramp: u32,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            star: 1,
            wall: 1,
            booster: 1,
            spike: 1,
            portal: 1,
            ramp: 1,
        }
    }
}

impl IdCounters {
    fn next(&mut self, kind: EntityKind) -> u32 {
        let slot = match kind {
            EntityKind::Star => &mut self.star,
            EntityKind::Wall => &mut self.wall,
            EntityKind::Booster => &mut self.booster,
            EntityKind::Spike => &mut self.spike,
            EntityKind::Portal => &mut self.portal,
            EntityKind::Ramp => &mut self.ramp,
            EntityKind::Bowl => return 0,
        };
        let id = *slot;
        *slot += 1;
        id
    }
}

/// Complete level contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDocument {
    pub ball_start: Vec3,
    pub bowl: Vec3,
    pub stars: Vec<Star>,
    pub walls: Vec<Wall>,
    pub boosters: Vec<Booster>,
    pub spikes: Vec<Spike>,
    pub portals: Vec<Portal>,
    pub ramps: Vec<Ramp>,
    /// Always equal to `stars.len()`
    total_stars: usize,
    pub level_number: u32,
    ids: IdCounters,
}

impl Default for LevelDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelDocument {
    /// Empty level with the default ball start and bowl
    pub fn new() -> Self {
        Self {
            ball_start: DEFAULT_BALL_START,
            bowl: DEFAULT_BOWL,
            stars: Vec::new(),
            walls: Vec::new(),
            boosters: Vec::new(),
            spikes: Vec::new(),
            portals: Vec::new(),
            ramps: Vec::new(),
            total_stars: 0,
            level_number: 1,
            ids: IdCounters::default(),
        }
    }

    pub fn total_stars(&self) -> usize {
        self.total_stars
    }

    fn sync_star_total(&mut self) {
        self.total_stars = self.stars.len();
    }

    /// Add a single entity and return its reference
    pub fn add_entity(&mut self, spec: EntitySpec) -> EntityRef {
        let kind = spec.kind();
        let id = self.ids.next(kind);
        match spec {
            EntitySpec::Star { position } => {
                self.stars.push(Star {
                    id,
                    position,
                    collected: false,
                });
                self.sync_star_total();
            }
            EntitySpec::Wall { start, end } => self.walls.push(Wall { id, start, end }),
            EntitySpec::Booster { start, end } => self.boosters.push(Booster { id, start, end }),
            EntitySpec::Spike { position } => self.spikes.push(Spike { id, position }),
            EntitySpec::Ramp {
                position,
                rotation_z,
                length,
            } => self.ramps.push(Ramp {
                id,
                position,
                rotation_z,
                length,
            }),
        }
        EntityRef::new(kind, id)
    }

    /// Add two portals linked to each other. Both land in the document or neither does.
    pub fn add_portal_pair(&mut self, a: Vec3, b: Vec3) -> (u32, u32) {
        let id_a = self.ids.next(EntityKind::Portal);
        let id_b = self.ids.next(EntityKind::Portal);
        self.portals.push(Portal {
            id: id_a,
            position: a,
            linked_id: Some(id_b),
            cooldown_until: None,
        });
        self.portals.push(Portal {
            id: id_b,
            position: b,
            linked_id: Some(id_a),
            cooldown_until: None,
        });
        (id_a, id_b)
    }

    /// Remove an entity. Removing a portal also removes its partner.
    ///
    /// Returns every reference that left the document (empty for the bowl or
    /// an unknown id).
    pub fn remove_entity(&mut self, entity: EntityRef) -> Vec<EntityRef> {
        let id = entity.id;
        let removed = match entity.kind {
            EntityKind::Star => {
                let before = self.stars.len();
                self.stars.retain(|s| s.id != id);
                let hit = self.stars.len() != before;
                self.sync_star_total();
                hit
            }
            EntityKind::Wall => remove_by_id(&mut self.walls, |w| w.id == id),
            EntityKind::Booster => remove_by_id(&mut self.boosters, |b| b.id == id),
            EntityKind::Spike => remove_by_id(&mut self.spikes, |s| s.id == id),
            EntityKind::Ramp => remove_by_id(&mut self.ramps, |r| r.id == id),
            EntityKind::Portal => {
                let Some(portal) = self.portals.iter().find(|p| p.id == id) else {
                    return Vec::new();
                };
                let partner = portal.linked_id;
                self.portals
                    .retain(|p| p.id != id && Some(p.id) != partner);
                let mut out = vec![entity];
                if let Some(pid) = partner {
                    out.push(EntityRef::new(EntityKind::Portal, pid));
                }
                return out;
            }
            EntityKind::Bowl => false,
        };
        if removed { vec![entity] } else { Vec::new() }
    }

    /// Find the entity nearest to `pos` within `threshold`.
    ///
    /// Lists are scanned in `EntityKind::PICK_ORDER`; only a strictly closer
    /// hit replaces an earlier one. The bowl is checked last with its own
    /// radius and overrides a closer hit when within `closest + BOWL_TIE_MARGIN`.
    pub fn find_nearest(&self, pos: Vec3, threshold: f32) -> Option<EntityRef> {
        let mut best: Option<(EntityRef, f32)> = None;
        let mut consider = |r: EntityRef, d: f32| {
            if d < threshold && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((r, d));
            }
        };

        for kind in EntityKind::PICK_ORDER {
            match kind {
                EntityKind::Star => {
                    for s in &self.stars {
                        consider(EntityRef::new(kind, s.id), pos.distance(s.position));
                    }
                }
                EntityKind::Wall => {
                    for w in &self.walls {
                        consider(
                            EntityRef::new(kind, w.id),
                            distance_to_segment(pos, w.start, w.end),
                        );
                    }
                }
                EntityKind::Booster => {
                    for b in &self.boosters {
                        consider(
                            EntityRef::new(kind, b.id),
                            distance_to_segment(pos, b.start, b.end),
                        );
                    }
                }
                EntityKind::Spike => {
                    for s in &self.spikes {
                        consider(EntityRef::new(kind, s.id), pos.distance(s.position));
                    }
                }
                EntityKind::Portal => {
                    for p in &self.portals {
                        consider(EntityRef::new(kind, p.id), pos.distance(p.position));
                    }
                }
                EntityKind::Ramp => {
                    for r in &self.ramps {
                        consider(EntityRef::new(kind, r.id), pos.distance(r.position));
                    }
                }
                EntityKind::Bowl => {}
            }
        }

        let bowl_dist = pos.distance(self.bowl);
        if bowl_dist < BOWL_PICK_RADIUS {
            match best {
                None => return Some(EntityRef::bowl()),
                Some((_, closest)) if bowl_dist < closest + BOWL_TIE_MARGIN => {
                    return Some(EntityRef::bowl());
                }
                _ => {}
            }
        }

        best.map(|(r, _)| r)
    }

    /// Position used as the drag handle (segment midpoint for walls/boosters)
    pub fn entity_anchor(&self, entity: EntityRef) -> Option<Vec3> {
        let id = entity.id;
        match entity.kind {
            EntityKind::Star => self.stars.iter().find(|s| s.id == id).map(|s| s.position),
            EntityKind::Wall => self.walls.iter().find(|w| w.id == id).map(|w| w.center()),
            EntityKind::Booster => self.boosters.iter().find(|b| b.id == id).map(|b| b.center()),
            EntityKind::Spike => self.spikes.iter().find(|s| s.id == id).map(|s| s.position),
            EntityKind::Portal => self.portals.iter().find(|p| p.id == id).map(|p| p.position),
            EntityKind::Ramp => self.ramps.iter().find(|r| r.id == id).map(|r| r.position),
            EntityKind::Bowl => Some(self.bowl),
        }
    }

    /// Move an entity by `delta`. Segments move both endpoints, keeping shape.
    pub fn translate_entity(&mut self, entity: EntityRef, delta: Vec3) -> bool {
        let id = entity.id;
        match entity.kind {
            EntityKind::Star => match self.stars.iter_mut().find(|s| s.id == id) {
                Some(s) => s.position += delta,
                None => return false,
            },
            EntityKind::Wall => match self.walls.iter_mut().find(|w| w.id == id) {
                Some(w) => {
                    w.start += delta;
                    w.end += delta;
                }
                None => return false,
            },
            EntityKind::Booster => match self.boosters.iter_mut().find(|b| b.id == id) {
                Some(b) => {
                    b.start += delta;
                    b.end += delta;
                }
                None => return false,
            },
            EntityKind::Spike => match self.spikes.iter_mut().find(|s| s.id == id) {
                Some(s) => s.position += delta,
                None => return false,
            },
            EntityKind::Portal => match self.portals.iter_mut().find(|p| p.id == id) {
                Some(p) => p.position += delta,
                None => return false,
            },
            EntityKind::Ramp => match self.ramps.iter_mut().find(|r| r.id == id) {
                Some(r) => r.position += delta,
                None => return false,
            },
            EntityKind::Bowl => self.bowl += delta,
        }
        true
    }

    pub fn portal(&self, id: u32) -> Option<&Portal> {
        self.portals.iter().find(|p| p.id == id)
    }

    /// Whether a reference still resolves to something in the document
    pub fn contains(&self, entity: EntityRef) -> bool {
        self.entity_anchor(entity).is_some()
    }

    /// Every entity reference, in pick order (bowl excluded)
    pub fn entity_refs(&self) -> Vec<EntityRef> {
        let mut out = Vec::new();
        out.extend(self.stars.iter().map(|s| EntityRef::new(EntityKind::Star, s.id)));
        out.extend(self.walls.iter().map(|w| EntityRef::new(EntityKind::Wall, w.id)));
        out.extend(self.boosters.iter().map(|b| EntityRef::new(EntityKind::Booster, b.id)));
        out.extend(self.spikes.iter().map(|s| EntityRef::new(EntityKind::Spike, s.id)));
        out.extend(self.portals.iter().map(|p| EntityRef::new(EntityKind::Portal, p.id)));
        out.extend(self.ramps.iter().map(|r| EntityRef::new(EntityKind::Ramp, r.id)));
        out
    }

    /// True when every portal has a partner that links back
    pub fn validate_links(&self) -> bool {
        self.portals.iter().all(|p| match p.linked_id {
            Some(other) => self
                .portal(other)
                .is_some_and(|q| q.linked_id == Some(p.id) && q.id != p.id),
            None => false,
        })
    }

    /// Clear star collection flags
    pub fn reset_stars(&mut self) {
        for star in &mut self.stars {
            star.collected = false;
        }
    }

    /// Drop all entities and restore the default singletons.
    ///
    /// Id counters keep counting so references held elsewhere never alias new
    /// entities.
    pub fn clear(&mut self) {
        self.stars.clear();
        self.walls.clear();
        self.boosters.clear();
        self.spikes.clear();
        self.portals.clear();
        self.ramps.clear();
        self.ball_start = DEFAULT_BALL_START;
        self.bowl = DEFAULT_BOWL;
        self.sync_star_total();
    }

    /// Remove player-placed obstacles, keeping stars, ball start and bowl.
    ///
    /// Returns the removed references.
    pub fn clear_placed(&mut self) -> Vec<EntityRef> {
        let removed: Vec<EntityRef> = self
            .entity_refs()
            .into_iter()
            .filter(|r| r.kind != EntityKind::Star)
            .collect();
        self.walls.clear();
        self.boosters.clear();
        self.spikes.clear();
        self.portals.clear();
        self.ramps.clear();
        removed
    }
}

fn remove_by_id<T>(list: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    match list.iter().position(pred) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}
