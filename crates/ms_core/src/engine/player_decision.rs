//! Decision substrate: play-state dispatch into intention writers.
//!
//! This is deliberately the shallow end of the AI — the cadence, the
//! perceived-world inputs and the intention contract are the product; the
//! tactical depth is a pluggable brain behind this dispatch. Handlers read
//! the player's own perceived world (never ground truth) and write an
//! `Intention`; they do not touch bodies, the ball, or the scheduler.

use super::geometry::Vec2;
use super::intention::{Intention, IntentionKind, SpeedHint, TacticalReason};
use super::match_engine::MatchWorld;
use super::physics_constants::keeper;
use super::squad::PositionRole;
use super::events::ShoutKind;

/// Fraction of the slot-to-ball offset blended into the hold-shape target.
/// The formation breathes with play instead of standing on fixed points.
const BALL_PULL: f32 = 0.15;
/// A chaser gives up and re-shapes beyond this distance to the ball (m).
const CHASE_RADIUS: f32 = 45.0;
/// Shooting range from goal center (m).
const SHOOT_RANGE: f32 = 25.0;
/// Passing is preferred this far from goal when a teammate is well ahead (m).
const PASS_RANGE: f32 = 40.0;
/// A pass target must be at least this much closer to goal (m).
const PASS_GAIN: f32 = 10.0;
/// Keeper leaves his line for balls inside this distance (m).
const KEEPER_CLAIM_RADIUS: f32 = 8.0;
/// A ball higher than this is chased at its predicted landing spot (m).
const AIRBORNE_HEIGHT: f32 = 1.0;
/// GetForward / TrackBack shout shift (m).
const SHOUT_SHIFT: f32 = 8.0;

/// Produce one intention for one player. Pure with respect to the world:
/// reads only, the caller stores the result.
pub fn decide(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let state = world.state.play_state;

    if state.is_ceremony() {
        return Intention { tactical_reason: TacticalReason::None, ..Intention::idle() };
    }
    if state.is_setup() {
        return decide_setup(world, idx);
    }
    if state.is_kick() {
        return decide_kick(world, idx);
    }
    match player.role {
        PositionRole::Goalkeeper => decide_goalkeeper(world, idx),
        _ => decide_outfielder(world, idx),
    }
}

/// Walk to the formation slot and face the play.
fn decide_setup(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let target = match player.role {
        PositionRole::Goalkeeper => world.keeper_home(player.team_index),
        _ => world.slot_world(idx),
    };
    let attack = world.teams[player.team_index].defending_side.attack_direction();
    Intention {
        kind: IntentionKind::MoveToPosition,
        target_position: Some(target),
        face_target: Some(player.body.position + attack * 10.0),
        speed_hint: SpeedHint::Walk,
        tactical_reason: TacticalReason::SetPiece,
        ..Intention::default()
    }
}

/// The nearest player to the dead ball takes it; everyone else holds shape.
fn decide_kick(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let ball = player.vision.ball.position;
    if is_designated_taker(world, idx) {
        let dist = player.body.position.distance_to(ball);
        if dist > 1.0 {
            return Intention {
                kind: IntentionKind::MoveToPosition,
                target_position: Some(ball),
                speed_hint: SpeedHint::Jog,
                tactical_reason: TacticalReason::SetPiece,
                ..Intention::default()
            };
        }
        let attack = world.teams[player.team_index].defending_side.attack_direction();
        return Intention {
            kind: IntentionKind::TakeSetPiece,
            target_position: Some(ball + attack * 15.0),
            speed_hint: SpeedHint::Idle,
            tactical_reason: TacticalReason::SetPiece,
            ..Intention::default()
        };
    }
    decide_setup(world, idx)
}

/// Closest teammate to the dead ball, ties broken by id.
fn is_designated_taker(world: &MatchWorld, idx: usize) -> bool {
    let player = &world.players[idx];
    let ball = player.vision.ball.position;
    let my_key = taker_key(player.body.position.distance_to(ball), player.id);
    world
        .players
        .iter()
        .filter(|p| p.team_index == player.team_index)
        .all(|p| taker_key(p.body.position.distance_to(ball), p.id) >= my_key)
}

fn taker_key(dist: f32, id: u32) -> (u32, u32) {
    // Millimeter-quantized distance keeps the comparison total and stable.
    ((dist * 1000.0) as u32, id)
}

fn decide_goalkeeper(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let ball = player.vision.ball.position;
    let side = world.teams[player.team_index].defending_side;
    let home = world.keeper_home(player.team_index);

    if world.ball.held_by() == Some(player.id) {
        // Distribute: clear toward the halfway line.
        let attack = side.attack_direction();
        return Intention {
            kind: IntentionKind::ClearBall,
            target_position: Some(Vec2::new(attack.x * 5.0, player.body.position.y * 0.5)),
            power: Some(14.0),
            speed_hint: SpeedHint::Idle,
            tactical_reason: TacticalReason::KeeperDuty,
            ..Intention::default()
        };
    }

    let danger_zone = world.field.penalty_area(side).contains(ball);
    if danger_zone && player.body.position.distance_to(ball) < KEEPER_CLAIM_RADIUS {
        return Intention {
            kind: IntentionKind::KeeperClaimBall,
            target_position: Some(ball),
            speed_hint: SpeedHint::Sprint,
            tactical_reason: TacticalReason::KeeperDuty,
            ..Intention::default()
        };
    }

    // Track the ball laterally along the line, inside the goal mouth.
    let mouth = world.field.goal_width() * 0.5 + keeper::MOUTH_MARGIN;
    let target = Vec2::new(home.x, ball.y.clamp(-mouth, mouth) * 0.4);
    let dist = player.body.position.distance_to(target);
    Intention {
        kind: IntentionKind::KeeperHoldLine,
        target_position: Some(target),
        face_target: Some(ball),
        look_at_target: Some(ball),
        speed_hint: if dist > 3.0 { SpeedHint::Jog } else { SpeedHint::Walk },
        tactical_reason: TacticalReason::KeeperDuty,
        ..Intention::default()
    }
}

fn decide_outfielder(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let ball = player.vision.ball.position;

    if world.ball.held_by() == Some(player.id) {
        return decide_on_ball(world, idx);
    }

    // Shouts override shape: a press call sends the player to the ball, a
    // hold call pins him.
    match player.last_shout {
        Some(ShoutKind::CloseDown | ShoutKind::PressHigh | ShoutKind::PressHarder) => {
            return chase_ball(player.body.position, ball, TacticalReason::Pressing);
        }
        Some(ShoutKind::HoldPosition) => {
            return Intention {
                kind: IntentionKind::HoldPosition,
                target_position: Some(player.body.position),
                face_target: Some(ball),
                tactical_reason: TacticalReason::HoldShape,
                ..Intention::default()
            };
        }
        _ => {}
    }

    // A loose ball pulls in the closest man per team.
    let opponents_hold = world
        .ball
        .held_by()
        .and_then(|id| world.player_index_by_id(id))
        .map(|i| world.players[i].team_index != player.team_index)
        .unwrap_or(false);
    if (!world.ball.is_held() || opponents_hold)
        && nearest_teammate_to_ball(world, player.team_index) == Some(idx)
        && player.body.position.distance_to(ball) < CHASE_RADIUS
    {
        let reason = if opponents_hold { TacticalReason::Pressing } else { TacticalReason::Recovery };
        // A ball in the air is attacked where it will come down, not where
        // it hangs now.
        let target = if player.vision.ball.height > AIRBORNE_HEIGHT {
            super::ball_prediction::predict_landing(&world.ball, &world.ball_physics).0
        } else {
            ball
        };
        return chase_ball(player.body.position, target, reason);
    }

    hold_shape(world, idx)
}

fn chase_ball(position: Vec2, ball: Vec2, reason: TacticalReason) -> Intention {
    let dist = position.distance_to(ball);
    Intention {
        kind: IntentionKind::MoveToBall,
        target_position: Some(ball),
        look_at_target: Some(ball),
        speed_hint: if dist > 12.0 { SpeedHint::Sprint } else { SpeedHint::Run },
        tactical_reason: reason,
        ..Intention::default()
    }
}

/// Formation slot, pulled toward the ball so the shape breathes, shifted by
/// the get-forward/track-back shouts.
fn hold_shape(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let ball = player.vision.ball.position;
    let slot = world.slot_world(idx);
    let mut target = slot + (ball - slot) * BALL_PULL;
    let attack = world.teams[player.team_index].defending_side.attack_direction();
    match player.last_shout {
        Some(ShoutKind::GetForward) => target += attack * SHOUT_SHIFT,
        Some(ShoutKind::TrackBack) => target -= attack * SHOUT_SHIFT,
        _ => {}
    }
    let target = world.field.clamp_to_bounds(target);
    let dist = player.body.position.distance_to(target);
    Intention {
        kind: IntentionKind::MoveToPosition,
        target_position: Some(target),
        face_target: Some(ball),
        speed_hint: match dist {
            d if d > 10.0 => SpeedHint::Run,
            d if d > 3.0 => SpeedHint::Jog,
            _ => SpeedHint::Walk,
        },
        tactical_reason: TacticalReason::HoldShape,
        ..Intention::default()
    }
}

/// With the ball: shoot in range, pass when a teammate is much better
/// placed, otherwise carry toward goal.
fn decide_on_ball(world: &MatchWorld, idx: usize) -> Intention {
    let player = &world.players[idx];
    let target_side = world.teams[player.team_index].defending_side.opposite();
    let goal = world.field.goal_center(target_side);
    let dist_to_goal = player.body.position.distance_to(goal);

    if dist_to_goal < SHOOT_RANGE {
        return Intention {
            kind: IntentionKind::ShootAtGoal,
            target_position: Some(goal),
            power: Some(16.0 + dist_to_goal * 0.4),
            speed_hint: SpeedHint::Idle,
            tactical_reason: TacticalReason::Support,
            ..Intention::default()
        };
    }

    if dist_to_goal > PASS_RANGE {
        if let Some(mate) = best_pass_target(world, idx, goal, dist_to_goal) {
            return Intention {
                kind: IntentionKind::PassToPlayer,
                target_player_id: Some(mate.0),
                target_position: Some(mate.1),
                speed_hint: SpeedHint::Idle,
                tactical_reason: TacticalReason::Support,
                ..Intention::default()
            };
        }
    }

    Intention {
        kind: IntentionKind::DribbleToPosition,
        target_position: Some(goal),
        face_target: Some(goal),
        speed_hint: SpeedHint::Jog,
        tactical_reason: TacticalReason::Support,
        ..Intention::default()
    }
}

/// The perceived teammate closest to goal, if meaningfully ahead of the
/// carrier.
fn best_pass_target(
    world: &MatchWorld,
    idx: usize,
    goal: Vec2,
    carrier_dist: f32,
) -> Option<(u32, Vec2)> {
    let player = &world.players[idx];
    player
        .vision
        .players
        .iter()
        .filter(|p| p.team_id == player.team_id)
        .map(|p| (p.player_index, p.position, p.position.distance_to(goal)))
        .filter(|&(_, _, d)| d + PASS_GAIN < carrier_dist)
        .min_by(|a, b| taker_key(a.2, a.0).cmp(&taker_key(b.2, b.0)))
        .map(|(id, pos, _)| (id, pos))
}

/// Index of the teammate nearest the perceived ball (ground truth distance
/// would race with scan cadence; each player's own snapshot keeps this
/// deterministic).
fn nearest_teammate_to_ball(world: &MatchWorld, team_index: usize) -> Option<usize> {
    world
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.team_index == team_index && p.role != PositionRole::Goalkeeper)
        .min_by_key(|(_, p)| {
            taker_key(p.body.position.distance_to(p.vision.ball.position), p.id)
        })
        .map(|(i, _)| i)
}
