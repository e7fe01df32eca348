//! Built-in default level
//!
//! Used when no level list can be loaded. Each level number nudges the five
//! stars sideways and swings the bowl so consecutive built-in levels differ.

use glam::Vec3;

use super::document::LevelDocument;
use super::entity::EntitySpec;
use crate::consts::DEFAULT_BOWL;

const BASE_STARS: [Vec3; 5] = [
    Vec3::new(-5.0, 8.0, 0.0),
    Vec3::new(5.0, 6.0, 0.0),
    Vec3::new(-3.0, 2.0, 0.0),
    Vec3::new(4.0, -2.0, 0.0),
    Vec3::new(0.0, -6.0, 0.0),
];

/// Star positions for a built-in level
pub fn star_positions(level: u32) -> Vec<Vec3> {
    let n = level.max(1) as f32;
    BASE_STARS
        .iter()
        .enumerate()
        .map(|(i, base)| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            Vec3::new(
                base.x + (n - 1.0) * side,
                base.y + (n * i as f32).sin() * 0.5,
                base.z,
            )
        })
        .collect()
}

/// Bowl position for a built-in level
pub fn bowl_position(level: u32) -> Vec3 {
    if level <= 1 {
        return DEFAULT_BOWL;
    }
    let angle = level as f32 * 0.5;
    Vec3::new(angle.sin() * 3.0, -11.25, 0.0)
}

/// Build the default document for `level`
pub fn default_level(level: u32) -> LevelDocument {
    let mut doc = LevelDocument::new();
    doc.level_number = level.max(1);
    doc.bowl = bowl_position(level);
    for position in star_positions(level) {
        doc.add_entity(EntitySpec::Star { position });
    }
    doc
}

/// Level code of the default level (substituted when no levels load)
pub fn default_level_code() -> String {
    super::codec::encode(&default_level(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_matches_base_layout() {
        let doc = default_level(1);
        assert_eq!(doc.total_stars(), 5);
        assert_eq!(doc.stars[0].position, Vec3::new(-5.0, 8.0, 0.0));
        assert_eq!(doc.bowl, DEFAULT_BOWL);
    }

    #[test]
    fn test_later_levels_shift_stars_and_bowl() {
        let stars = star_positions(3);
        assert!((stars[0].x - (-3.0)).abs() < 1e-5);
        assert!((stars[1].x - 3.0).abs() < 1e-5);
        let bowl = bowl_position(3);
        assert!((bowl.x - 1.5f32.sin() * 3.0).abs() < 1e-5);
        assert_eq!(bowl.y, -11.25);
    }
}
