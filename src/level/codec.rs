//! Level-code text format
//!
//! One directive per line, `TYPE:v1,v2,...`. Export rounds every number to
//! two decimals; import accepts full precision. Decoding is best-effort:
//! unknown directives and lines without a `:` are skipped, and a missing
//! number parses as NaN rather than rejecting the line.

use std::collections::HashSet;
use std::fmt::Write;

use glam::Vec3;

use super::document::LevelDocument;
use super::entity::EntitySpec;
use crate::consts::LEGACY_BOOSTER_LENGTH;

/// Format a number with two decimals, never emitting `-0.00`
fn num(v: f32) -> String {
    let s = format!("{:.2}", v);
    if s == "-0.00" { "0.00".to_string() } else { s }
}

fn vec(v: Vec3) -> String {
    format!("{},{},{}", num(v.x), num(v.y), num(v.z))
}

/// Encode a document as level-code text
pub fn encode(doc: &LevelDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "BALL:{}", vec(doc.ball_start));
    let _ = writeln!(out, "BOWL:{}", vec(doc.bowl));

    for star in &doc.stars {
        let _ = writeln!(out, "STAR:{}", vec(star.position));
    }
    for wall in &doc.walls {
        let _ = writeln!(out, "WALL:{},{}", vec(wall.start), vec(wall.end));
    }
    for booster in &doc.boosters {
        let _ = writeln!(out, "BOOSTER:{},{}", vec(booster.start), vec(booster.end));
    }
    for spike in &doc.spikes {
        let _ = writeln!(out, "SPIKE:{}", vec(spike.position));
    }

    // One line per linked pair
    let mut visited: HashSet<u32> = HashSet::new();
    for portal in &doc.portals {
        if visited.contains(&portal.id) {
            continue;
        }
        let Some(partner) = portal.linked_id.and_then(|id| doc.portal(id)) else {
            continue;
        };
        visited.insert(portal.id);
        visited.insert(partner.id);
        let _ = writeln!(out, "PORTAL:{},{}", vec(portal.position), vec(partner.position));
    }

    for ramp in &doc.ramps {
        let _ = writeln!(
            out,
            "RAMP:{},{},{}",
            vec(ramp.position),
            num(ramp.rotation_z),
            num(ramp.length)
        );
    }

    out
}

/// Decode level-code text into a fresh document
pub fn decode(text: &str) -> LevelDocument {
    let mut doc = LevelDocument::new();
    decode_into(text, &mut doc);
    doc
}

/// Decode level-code text, fully replacing the contents of `doc`.
///
/// Level number and id counters are kept; `total_stars` follows the decoded
/// star list.
pub fn decode_into(text: &str, doc: &mut LevelDocument) {
    doc.clear();

    let mut skipped = 0usize;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((directive, params)) = line.split_once(':') else {
            skipped += 1;
            continue;
        };
        let v: Vec<f32> = params.split(',').map(parse_number).collect();
        let at = |i: usize| v.get(i).copied().unwrap_or(f32::NAN);
        let vec_at = |i: usize| Vec3::new(at(i), at(i + 1), at(i + 2));

        match directive.trim() {
            "BALL" => doc.ball_start = vec_at(0),
            "BOWL" => doc.bowl = vec_at(0),
            "STAR" => {
                doc.add_entity(EntitySpec::Star { position: vec_at(0) });
            }
            "WALL" => {
                doc.add_entity(EntitySpec::Wall {
                    start: vec_at(0),
                    end: vec_at(3),
                });
            }
            "BOOSTER" => match v.len() {
                4 => {
                    let (start, end) = legacy_booster(vec_at(0), at(3));
                    doc.add_entity(EntitySpec::Booster { start, end });
                }
                n if n >= 6 => {
                    doc.add_entity(EntitySpec::Booster {
                        start: vec_at(0),
                        end: vec_at(3),
                    });
                }
                n => {
                    log::debug!("Skipping booster line with {} fields", n);
                    skipped += 1;
                }
            },
            "SPIKE" => {
                doc.add_entity(EntitySpec::Spike { position: vec_at(0) });
            }
            "PORTAL" => {
                doc.add_portal_pair(vec_at(0), vec_at(3));
            }
            "RAMP" => {
                doc.add_entity(EntitySpec::Ramp {
                    position: vec_at(0),
                    rotation_z: at(3),
                    length: at(4),
                });
            }
            other => {
                log::debug!("Skipping unknown directive {:?}", other);
                skipped += 1;
            }
        }
    }

    log::info!(
        "Decoded level: {} stars, {} walls, {} boosters, {} spikes, {} portal pairs, {} ramps ({} lines skipped)",
        doc.stars.len(),
        doc.walls.len(),
        doc.boosters.len(),
        doc.spikes.len(),
        doc.portals.len() / 2,
        doc.ramps.len(),
        skipped
    );
}

fn parse_number(token: &str) -> f32 {
    token.trim().parse::<f32>().unwrap_or(f32::NAN)
}

/// Legacy boosters stored a centre and a direction angle (radians about Z)
fn legacy_booster(center: Vec3, angle: f32) -> (Vec3, Vec3) {
    let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
    let half = dir * (LEGACY_BOOSTER_LENGTH / 2.0);
    (center - half, center + half)
}
