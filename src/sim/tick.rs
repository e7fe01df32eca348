//! Per-tick gameplay rules
//!
//! Turns raw ball kinematics into game events. Rules run in a fixed order
//! (stars, boosters, portals, spikes, bowl, out-of-bounds, stuck) and all
//! proximity tests compare squared distances against squared radii.

use crate::level::LevelDocument;
use crate::planar_distance_squared;
use crate::tuning::Tuning;

use super::state::{BallKinematics, GameEvent, GameplayState, HazardCause};

/// Advance the session clock by `dt` seconds and evaluate the rules.
///
/// A scheduled win fires once its delay has elapsed even if the session has
/// already stopped; everything else only runs while `play.is_playing`.
pub fn tick(
    doc: &mut LevelDocument,
    play: &mut GameplayState,
    ball: &mut BallKinematics,
    tuning: &Tuning,
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt_ms = dt as f64 * 1000.0;
    play.clock_ms += dt_ms;
    let now = play.clock_ms;

    if play.pending_win_at.is_some_and(|at| now >= at) {
        play.pending_win_at = None;
        log::info!("Level {} won", doc.level_number);
        events.push(GameEvent::Won {
            level: doc.level_number,
        });
    }

    if !play.is_playing {
        return events;
    }

    // Expired cooldowns clear themselves
    for portal in &mut doc.portals {
        if portal.cooldown_until.is_some_and(|t| now >= t) {
            portal.cooldown_until = None;
        }
    }

    check_stars(doc, play, ball, tuning, &mut events);
    apply_boosters(doc, ball, tuning, &mut events);
    check_portals(doc, ball, tuning, now, &mut events);

    if hits_spike(doc, ball, tuning) {
        hazard_reset(doc, play, ball, HazardCause::Spike, &mut events);
        return events;
    }

    check_bowl(doc, play, ball, tuning, &mut events);

    // Checked even when the bowl just stopped the session
    if ball.position.y < tuning.out_of_bounds_y {
        hazard_reset(doc, play, ball, HazardCause::OutOfBounds, &mut events);
    }

    if play.is_playing {
        check_stuck(doc, play, ball, tuning, dt_ms, &mut events);
    }

    events
}

fn check_stars(
    doc: &mut LevelDocument,
    play: &mut GameplayState,
    ball: &BallKinematics,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let r2 = tuning.star_radius * tuning.star_radius;
    for star in doc.stars.iter_mut().filter(|s| !s.collected) {
        if ball.position.distance_squared(star.position) < r2 {
            star.collected = true;
            play.stars_collected += 1;
            events.push(GameEvent::StarCollected {
                id: star.id,
                position: star.position,
            });
        }
    }
}

/// Continuous push: every overlapping booster adds to the velocity every tick
fn apply_boosters(
    doc: &LevelDocument,
    ball: &mut BallKinematics,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    for booster in &doc.boosters {
        let center = booster.center();
        let half = booster.length() / 2.0 + tuning.booster_margin;
        let vertical = (ball.position.y - center.y).abs();
        if planar_distance_squared(ball.position, center) < half * half
            && vertical < tuning.booster_vertical_reach
        {
            ball.velocity += booster.direction() * tuning.boost_amount;
            events.push(GameEvent::Boosted { id: booster.id });
        }
    }
}

/// At most one teleport per tick. The destination cools down so the ball
/// does not bounce straight back.
fn check_portals(
    doc: &mut LevelDocument,
    ball: &mut BallKinematics,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<GameEvent>,
) {
    let r2 = tuning.portal_radius * tuning.portal_radius;
    let entered = doc.portals.iter().find(|p| {
        !p.is_cooling_down(now) && ball.position.distance_squared(p.position) < r2
    });
    let Some((from, Some(to))) = entered.map(|p| (p.id, p.linked_id)) else {
        return;
    };
    let Some(dest) = doc.portals.iter_mut().find(|p| p.id == to) else {
        return;
    };

    ball.position = dest.position;
    dest.cooldown_until = Some(now + tuning.portal_cooldown_ms);
    log::debug!("Teleported through portal {} -> {}", from, to);
    events.push(GameEvent::Teleported { from, to });
}

fn hits_spike(doc: &LevelDocument, ball: &BallKinematics, tuning: &Tuning) -> bool {
    let r2 = tuning.spike_radius * tuning.spike_radius;
    doc.spikes
        .iter()
        .any(|s| ball.position.distance_squared(s.position) < r2)
}

fn check_bowl(
    doc: &LevelDocument,
    play: &mut GameplayState,
    ball: &BallKinematics,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let r2 = tuning.bowl_radius * tuning.bowl_radius;
    if ball.position.distance_squared(doc.bowl) < r2
        && ball.position.y < doc.bowl.y + tuning.bowl_height_gate
    {
        play.is_playing = false;
        play.pending_win_at = Some(play.clock_ms + tuning.win_delay_ms);
        log::info!("Ball reached the bowl");
        events.push(GameEvent::GoalReached);
    }
}

fn check_stuck(
    doc: &mut LevelDocument,
    play: &mut GameplayState,
    ball: &mut BallKinematics,
    tuning: &Tuning,
    dt_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let resting = ball.position.y < tuning.stuck_height && ball.velocity.y.abs() < tuning.stuck_speed;
    if !resting {
        play.stuck_ms = 0.0;
        return;
    }
    play.stuck_ms += dt_ms;
    if play.stuck_ms >= tuning.stuck_delay_ms {
        hazard_reset(doc, play, ball, HazardCause::Stuck, events);
    }
}

/// The single recovery path for spikes, falling out and getting stuck.
///
/// Stops the session, freezes the ball at its start and restores all stars.
pub fn hazard_reset(
    doc: &mut LevelDocument,
    play: &mut GameplayState,
    ball: &mut BallKinematics,
    cause: HazardCause,
    events: &mut Vec<GameEvent>,
) {
    log::info!("Ball reset ({:?})", cause);
    play.is_playing = false;
    play.stuck_ms = 0.0;
    play.stars_collected = 0;
    *ball = BallKinematics::at_rest(doc.ball_start);
    doc.reset_stars();
    events.push(GameEvent::Hazard { cause });
}
