//! End-to-end behaviour: editor input, level codes and gameplay rules together

use glam::Vec3;
use proptest::collection::vec;
use proptest::prelude::*;

use star_drop::Tuning;
use star_drop::consts::SIM_DT;
use star_drop::editor::{EditorController, PointerEvent, ToolMode};
use star_drop::level::{EntityKind, EntitySpec, LevelDocument, decode, encode};
use star_drop::sim::{BallKinematics, GameEvent, GameplayState, HazardCause, tick};

fn v(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 0.0)
}

fn click(editor: &mut EditorController, doc: &mut LevelDocument, at: Vec3, t: f64) {
    let tuning = Tuning::default();
    editor.handle(doc, PointerEvent::down(at, t), &tuning);
    editor.handle(doc, PointerEvent::up(at, t + 60.0), &tuning);
}

fn drag(editor: &mut EditorController, doc: &mut LevelDocument, from: Vec3, to: Vec3, t: f64) {
    let tuning = Tuning::default();
    editor.handle(doc, PointerEvent::down(from, t), &tuning);
    editor.handle(doc, PointerEvent::moved((from + to) * 0.5, t + 50.0), &tuning);
    editor.handle(doc, PointerEvent::moved(to, t + 100.0), &tuning);
    editor.handle(doc, PointerEvent::up(to, t + 150.0), &tuning);
}

fn playing() -> GameplayState {
    GameplayState {
        is_playing: true,
        ..Default::default()
    }
}

#[test]
fn star_under_the_ball_is_collected_in_one_tick() {
    let mut doc = LevelDocument::new();
    doc.add_entity(EntitySpec::Star {
        position: Vec3::new(0.0, 5.0, 0.0),
    });
    let mut play = playing();
    let mut ball = BallKinematics::at_rest(Vec3::new(0.0, 5.0, 0.0));
    ball.dynamic = true;

    let events = tick(&mut doc, &mut play, &mut ball, &Tuning::default(), SIM_DT);
    let collected: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::StarCollected { .. }))
        .collect();
    assert_eq!(collected.len(), 1);
    assert!(doc.stars[0].collected);
}

#[test]
fn booster_segment_survives_a_round_trip() {
    let mut doc = LevelDocument::new();
    doc.add_entity(EntitySpec::Booster {
        start: Vec3::ZERO,
        end: Vec3::new(4.0, 0.0, 0.0),
    });
    let decoded = decode(&encode(&doc));
    assert_eq!(decoded.boosters.len(), 1);
    assert!(decoded.boosters[0].start.distance(Vec3::ZERO) < 0.01);
    assert!(decoded.boosters[0].end.distance(Vec3::new(4.0, 0.0, 0.0)) < 0.01);
}

#[test]
fn two_portal_clicks_make_one_linked_pair() {
    let mut doc = LevelDocument::new();
    let mut editor = EditorController::new();
    editor.set_tool(ToolMode::Portal);

    click(&mut editor, &mut doc, v(0.0, 0.0), 0.0);
    click(&mut editor, &mut doc, v(5.0, 0.0), 400.0);

    assert_eq!(doc.portals.len(), 2);
    let (a, b) = (&doc.portals[0], &doc.portals[1]);
    assert_eq!(a.linked_id, Some(b.id));
    assert_eq!(b.linked_id, Some(a.id));
    assert!(editor.pending_portal().is_none());

    // The pair is one line in the level code
    let code = encode(&doc);
    assert_eq!(code.lines().filter(|l| l.starts_with("PORTAL:")).count(), 1);
}

#[test]
fn falling_below_the_arena_resets_the_ball() {
    let mut doc = LevelDocument::new();
    doc.ball_start = Vec3::new(2.0, 10.0, 0.0);
    let mut play = playing();
    let mut ball = BallKinematics::at_rest(Vec3::new(0.0, -16.0, 0.0));
    ball.velocity = Vec3::new(0.0, -20.0, 0.0);
    ball.dynamic = true;

    let events = tick(&mut doc, &mut play, &mut ball, &Tuning::default(), SIM_DT);
    assert!(events.contains(&GameEvent::Hazard {
        cause: HazardCause::OutOfBounds
    }));
    assert_eq!(ball.position, doc.ball_start);
    assert_eq!(ball.velocity, Vec3::ZERO);
    assert!(!play.is_playing);
}

#[test]
fn short_wall_drag_adds_nothing() {
    let mut doc = LevelDocument::new();
    let mut editor = EditorController::new();
    editor.set_tool(ToolMode::Wall);
    drag(&mut editor, &mut doc, v(0.0, 0.0), v(0.0, 0.2), 0.0);
    assert!(doc.walls.is_empty());

    drag(&mut editor, &mut doc, v(0.0, 0.0), v(0.0, 2.0), 500.0);
    assert_eq!(doc.walls.len(), 1);
}

#[test]
fn star_total_tracks_edits_and_loads() {
    let mut doc = LevelDocument::new();
    let mut editor = EditorController::new();

    editor.set_tool(ToolMode::Star);
    for (i, x) in [-6.0, -2.0, 2.0, 6.0].into_iter().enumerate() {
        click(&mut editor, &mut doc, v(x, 4.0), i as f64 * 200.0);
    }
    assert_eq!(doc.total_stars(), 4);

    editor.set_tool(ToolMode::Delete);
    click(&mut editor, &mut doc, v(2.0, 4.0), 2000.0);
    assert_eq!(doc.total_stars(), 3);
    assert_eq!(doc.total_stars(), doc.stars.len());

    let reloaded = decode(&encode(&doc));
    assert_eq!(reloaded.total_stars(), 3);
}

#[test]
fn deleting_either_portal_removes_the_pair() {
    let mut doc = LevelDocument::new();
    doc.add_portal_pair(v(-5.0, 0.0), v(5.0, 0.0));
    doc.add_portal_pair(v(-5.0, 6.0), v(5.0, 6.0));
    let mut editor = EditorController::new();
    editor.set_tool(ToolMode::Delete);

    click(&mut editor, &mut doc, v(5.0, 6.0), 0.0);
    assert_eq!(doc.portals.len(), 2);
    assert!(doc.validate_links());

    click(&mut editor, &mut doc, v(-5.0, 0.0), 500.0);
    assert!(doc.portals.is_empty());
}

#[test]
fn authored_level_plays_through_portal_into_bowl() {
    let mut doc = LevelDocument::new();
    doc.bowl = v(8.0, -11.0);
    let mut editor = EditorController::new();
    editor.set_tool(ToolMode::Portal);
    click(&mut editor, &mut doc, v(0.0, 0.0), 0.0);
    click(&mut editor, &mut doc, v(8.0, -10.5), 300.0);

    // Reload from the level code like a shared level would be
    let mut doc = decode(&encode(&doc));
    let tuning = Tuning::default();
    let mut play = playing();
    let mut ball = BallKinematics::at_rest(v(0.0, 0.2));
    ball.dynamic = true;

    let events = tick(&mut doc, &mut play, &mut ball, &tuning, SIM_DT);
    assert!(matches!(events[0], GameEvent::Teleported { .. }));
    assert!(events.contains(&GameEvent::GoalReached));
    assert!(!play.is_playing);

    let mut won = false;
    for _ in 0..40 {
        won |= tick(&mut doc, &mut play, &mut ball, &tuning, SIM_DT)
            .contains(&GameEvent::Won { level: 1 });
    }
    assert!(won);
}

fn point() -> impl Strategy<Value = Vec3> {
    (-20.0f32..20.0, -20.0f32..20.0, -1.0f32..1.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() <= 0.01
}

proptest! {
    #[test]
    fn level_code_round_trip(
        ball in point(),
        bowl in point(),
        stars in vec(point(), 0..6),
        walls in vec((point(), point()), 0..4),
        boosters in vec((point(), point()), 0..4),
        spikes in vec(point(), 0..4),
        portals in vec((point(), point()), 0..3),
        ramps in vec((point(), -3.0f32..3.0, 0.5f32..6.0), 0..3),
    ) {
        let mut doc = LevelDocument::new();
        doc.ball_start = ball;
        doc.bowl = bowl;
        for &position in &stars {
            doc.add_entity(EntitySpec::Star { position });
        }
        for &(start, end) in &walls {
            doc.add_entity(EntitySpec::Wall { start, end });
        }
        for &(start, end) in &boosters {
            doc.add_entity(EntitySpec::Booster { start, end });
        }
        for &position in &spikes {
            doc.add_entity(EntitySpec::Spike { position });
        }
        for &(a, b) in &portals {
            doc.add_portal_pair(a, b);
        }
        for &(position, rotation_z, length) in &ramps {
            doc.add_entity(EntitySpec::Ramp { position, rotation_z, length });
        }

        let back = decode(&encode(&doc));

        prop_assert!(close(back.ball_start, doc.ball_start));
        prop_assert!(close(back.bowl, doc.bowl));
        prop_assert_eq!(back.total_stars(), doc.total_stars());
        prop_assert_eq!(back.walls.len(), doc.walls.len());
        prop_assert_eq!(back.boosters.len(), doc.boosters.len());
        prop_assert_eq!(back.spikes.len(), doc.spikes.len());
        prop_assert_eq!(back.portals.len(), doc.portals.len());
        prop_assert_eq!(back.ramps.len(), doc.ramps.len());
        prop_assert!(back.validate_links());

        for (a, b) in back.stars.iter().zip(&doc.stars) {
            prop_assert!(close(a.position, b.position));
        }
        for (a, b) in back.walls.iter().zip(&doc.walls) {
            prop_assert!(close(a.start, b.start) && close(a.end, b.end));
        }
        for (a, b) in back.boosters.iter().zip(&doc.boosters) {
            prop_assert!(close(a.start, b.start) && close(a.end, b.end));
        }
        for (a, b) in back.spikes.iter().zip(&doc.spikes) {
            prop_assert!(close(a.position, b.position));
        }
        for (a, b) in back.portals.iter().zip(&doc.portals) {
            prop_assert!(close(a.position, b.position));
        }
        for (a, b) in back.ramps.iter().zip(&doc.ramps) {
            prop_assert!(close(a.position, b.position));
            prop_assert!((a.rotation_z - b.rotation_z).abs() <= 0.01);
            prop_assert!((a.length - b.length).abs() <= 0.01);
        }
        prop_assert_eq!(
            back.entity_refs().iter().filter(|r| r.kind == EntityKind::Portal).count(),
            portals.len() * 2
        );
    }
}
