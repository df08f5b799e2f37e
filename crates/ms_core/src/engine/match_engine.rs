//! Match engine: the shared world and the per-tick pipeline.
//!
//! `MatchWorld` is the context every scheduled callback runs against. The
//! engine wires one repeating subscription per concern at initialization:
//! ball physics and per-player body physics at the physics cadence, per-
//! player AI at ~100 ms with a deterministic stagger and per-fire jitter,
//! and per-player vision at the attribute-derived scan cadence. All of them
//! re-arm themselves until full time, after which the queue drains dry.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::replay::ReplayLog;

use super::ball::Ball;
use super::ball_physics::BallPhysics;
use super::config::EngineConfig;
use super::events::{EventKind, EventPayload, ExternalEvent, ShoutKind, TeamInstructions};
use super::field::{BoundaryClass, Field, Side};
use super::formation::FormationRegion;
use super::geometry::{Vec2, Vec3};
use super::head_movement;
use super::intention::{Intention, IntentionKind};
use super::match_events::{MatchEventKind, MatchEventLog};
use super::match_state::{MatchState, PlayState};
use super::physics_constants::{head, keeper};
use super::player_body::PlayerBody;
use super::player_physics;
use super::rng::SimRng;
use super::scheduler::{EventScheduler, Tick};
use super::squad::{PlayerAttributes, PositionRole, TeamSheet};
use super::steering::{self, SteeringOutput};
use super::vision::{self, PerceivedBall, PerceivedPlayer, PlayerVision};

/// A free ball inside this radius can be taken under control (m).
const PICKUP_RADIUS: f32 = 0.6;
/// Carried ball rides this far ahead of the dribbler's feet (m).
const CARRY_LEAD: f32 = 0.4;
/// Default power of an executed shot (m/s).
const SHOT_POWER: f32 = 18.0;
/// Vertical fraction of shot power: a low driven ball.
const SHOT_LOFT: f32 = 0.12;
/// Pass power scales with distance up to this cap (m/s).
const PASS_POWER_MAX: f32 = 16.0;

/// One fielded player: identity, body, perception, and current intention.
#[derive(Debug)]
pub struct MatchPlayer {
    pub id: u32,
    pub team_id: u32,
    pub team_index: usize,
    pub role: PositionRole,
    pub attributes: PlayerAttributes,
    /// Normalized formation slot.
    pub slot: (f32, f32),
    pub body: PlayerBody,
    pub vision: PlayerVision,
    pub intention: Intention,
    /// Most recent touchline shout aimed at this player.
    pub last_shout: Option<ShoutKind>,
}

/// Everything the simulation mutates tick to tick. Owned by the match
/// aggregate; handed to every scheduler callback.
pub struct MatchWorld {
    pub config: EngineConfig,
    pub field: Field,
    pub teams: [TeamSheet; 2],
    pub regions: [FormationRegion; 2],
    pub ball: Ball,
    pub ball_physics: BallPhysics,
    pub players: Vec<MatchPlayer>,
    pub rng: SimRng,
    pub state: MatchState,
    /// External events recorded with their assigned `(tick, seq)`.
    pub replay: ReplayLog,
    /// Narrative record: kickoff, goals, possession, full time.
    pub events: MatchEventLog,
    pub finished: bool,
    match_length: Tick,
    /// Last player to control or strike the ball, for goal attribution.
    last_touch: Option<u32>,
    steering_scratch: SteeringOutput,
    neighbor_scratch: Vec<Vec2>,
    perceived_scratch: Vec<PerceivedPlayer>,
}

impl MatchWorld {
    pub fn new(seed: u64, config: EngineConfig, home: TeamSheet, away: TeamSheet) -> Result<Self> {
        home.validate()?;
        away.validate()?;
        if home.defending_side == away.defending_side {
            return Err(EngineError::InvalidConfig(
                "both teams defend the same side".to_string(),
            ));
        }
        let field = Field::new(&config.field);
        let regions = [
            FormationRegion::kickoff(&field, home.defending_side),
            FormationRegion::kickoff(&field, away.defending_side),
        ];
        let ball_physics = BallPhysics::new(config.ball);
        let ball = Ball::new(ball_physics.radius());
        let match_length = config.match_length();
        let mut world = Self {
            config,
            field,
            teams: [home, away],
            regions,
            ball,
            ball_physics,
            players: Vec::with_capacity(22),
            rng: SimRng::new(seed),
            state: MatchState::default(),
            replay: ReplayLog::default(),
            events: MatchEventLog::default(),
            finished: false,
            match_length,
            last_touch: None,
            steering_scratch: SteeringOutput::default(),
            neighbor_scratch: Vec::with_capacity(21),
            perceived_scratch: Vec::with_capacity(21),
        };
        world.field_players();
        Ok(world)
    }

    /// Build a body for every lineup slot. Bodies face the attack direction;
    /// the goalkeeper stands off his line instead of on his slot.
    fn field_players(&mut self) {
        for team_index in 0..2 {
            let team = &self.teams[team_index];
            let attack = team.defending_side.attack_direction();
            for slot in team.lineup.clone() {
                let profile = team
                    .player(slot.player_id)
                    .expect("lineup validated against the roster");
                let spawn = if profile.role == PositionRole::Goalkeeper {
                    self.keeper_home(team_index)
                } else {
                    self.regions[team_index].slot_to_world(slot.sx, slot.sy)
                };
                let attributes = profile.attributes;
                let role = profile.role;
                let id = profile.id;
                let team_id = self.teams[team_index].id;
                self.players.push(MatchPlayer {
                    id,
                    team_id,
                    team_index,
                    role,
                    attributes,
                    slot: (slot.sx, slot.sy),
                    body: PlayerBody::new(spawn, attack),
                    vision: PlayerVision::new(&attributes),
                    intention: Intention::idle(),
                    last_shout: None,
                });
            }
        }
    }

    #[inline]
    pub fn match_length(&self) -> Tick {
        self.match_length
    }

    pub fn team_index_of(&self, team_id: u32) -> Option<usize> {
        self.teams.iter().position(|t| t.id == team_id)
    }

    /// Which team defends the given side.
    pub fn team_defending(&self, side: Side) -> usize {
        if self.teams[0].defending_side == side {
            0
        } else {
            1
        }
    }

    /// The keeper's default station: a few meters off the own goal line,
    /// centered.
    pub fn keeper_home(&self, team_index: usize) -> Vec2 {
        let side = self.teams[team_index].defending_side;
        let goal = self.field.goal_center(side);
        goal + side.attack_direction() * keeper::GOAL_LINE_OFFSET
    }

    /// World position of a player's formation slot.
    pub fn slot_world(&self, idx: usize) -> Vec2 {
        let p = &self.players[idx];
        self.regions[p.team_index].slot_to_world(p.slot.0, p.slot.1)
    }

    pub fn player_index_by_id(&self, id: u32) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Kickoff: ball on the center spot, game on.
    pub fn kickoff(&mut self) {
        self.ball.reposition(0.0, 0.0, self.ball_physics.radius());
        self.state.play_state = PlayState::NormalPlay;
        self.state.possession = None;
        self.events.push(self.state.time_elapsed_ms, MatchEventKind::Kickoff);
        log::info!("kickoff: {} vs {}", self.teams[0].name, self.teams[1].name);
    }

    // ------------------------------------------------------------------
    // Per-tick pipeline
    // ------------------------------------------------------------------

    fn physics_dt(&self) -> f32 {
        self.config.cadence.physics_interval_ms as f32 / 1000.0
    }

    /// Ball subscription body: integrate or ride with the holder, then
    /// resolve boundaries.
    pub fn ball_tick(&mut self) {
        let radius = self.ball_physics.radius();
        if let Some(holder_id) = self.ball.held_by() {
            if let Some(idx) = self.player_index_by_id(holder_id) {
                let body = &self.players[idx].body;
                let carry = body.position + body.body_dir() * CARRY_LEAD;
                self.ball.carry_to(carry, radius);
            } else {
                // Holder left the pitch (substitution): ball comes loose.
                self.ball.release();
            }
            return;
        }
        let dt = self.physics_dt();
        self.ball.update(&self.ball_physics, dt);
        if self.state.play_state.is_open_play() {
            self.resolve_ball_boundary();
        }
    }

    /// Goals and dead balls. Restart bookkeeping beyond the score is out of
    /// scope: the ball is returned to play at the nearest legal spot.
    fn resolve_ball_boundary(&mut self) {
        let pos = self.ball.position2d();
        match self.field.classify(pos) {
            BoundaryClass::InPlay => {}
            BoundaryClass::OffGoalLine { side, inside_goal_mouth } => {
                let under_bar = self.ball.position().y <= self.field.goal_height();
                if inside_goal_mouth && under_bar {
                    let scorer = 1 - self.team_defending(side);
                    if scorer == 0 {
                        self.state.home_score += 1;
                    } else {
                        self.state.away_score += 1;
                    }
                    // Attribute the goal to the last touch only when it came
                    // from the scoring team; an own goal stays anonymous.
                    let scorer_id = self
                        .last_touch
                        .and_then(|id| self.player_index_by_id(id))
                        .filter(|&i| self.players[i].team_index == scorer)
                        .map(|i| self.players[i].id);
                    self.events.push(
                        self.state.time_elapsed_ms,
                        MatchEventKind::Goal { team_id: self.teams[scorer].id, scorer_id },
                    );
                    log::info!(
                        "goal! {} {} - {} {} at {} ms",
                        self.teams[0].name,
                        self.state.home_score,
                        self.state.away_score,
                        self.teams[1].name,
                        self.state.time_elapsed_ms
                    );
                    self.ball.reposition(0.0, 0.0, self.ball_physics.radius());
                    self.state.possession = None;
                } else {
                    let back = self.field.clamp_to_bounds(pos);
                    self.ball.reposition(back.x, back.y, self.ball_physics.radius());
                }
            }
            BoundaryClass::OffTouchline { .. } => {
                let back = self.field.clamp_to_bounds(pos);
                self.ball.reposition(back.x, back.y, self.ball_physics.radius());
            }
        }
    }

    /// Player physics subscription body: steering, integration, head
    /// movement, and on-ball execution.
    pub fn physics_tick(&mut self, idx: usize, now: Tick) {
        if idx >= self.players.len() {
            return;
        }
        let dt = self.physics_dt();

        self.neighbor_scratch.clear();
        self.neighbor_scratch
            .extend(self.players[idx].vision.players.iter().map(|p| p.position));

        let mut out = self.steering_scratch;
        steering::drive(
            &mut out,
            &self.players[idx].body,
            &self.players[idx].intention,
            &self.neighbor_scratch,
        );
        player_physics::integrate(&mut self.players[idx].body, &out, dt);
        head_movement::update_head(&mut self.players[idx].body, now, &mut self.rng, dt);
        let stamina = self.players[idx].attributes.stamina;
        player_physics::fatigue_step(&mut self.players[idx].body, stamina, dt);
        self.steering_scratch = out;

        if self.state.play_state.is_open_play() && !self.finished {
            self.resolve_ball_contact(idx);
        }
    }

    /// Take a loose ball inside the pickup radius, or execute the holder's
    /// on-ball intention. AI handlers only ever write intentions; this is
    /// where they touch the ball.
    fn resolve_ball_contact(&mut self, idx: usize) {
        let player_id = self.players[idx].id;
        match self.ball.held_by() {
            None => {
                let dist = self.players[idx]
                    .body
                    .position
                    .distance_to(self.ball.position2d());
                if dist < PICKUP_RADIUS && self.ball.on_ground() {
                    self.ball.set_held_by(player_id);
                    self.state.possession = Some(self.players[idx].team_id);
                    self.last_touch = Some(player_id);
                    self.events.push(
                        self.state.time_elapsed_ms,
                        MatchEventKind::PossessionWon {
                            team_id: self.players[idx].team_id,
                            player_id,
                        },
                    );
                    log::debug!("player {player_id} takes possession");
                }
            }
            Some(holder) if holder == player_id => self.execute_on_ball(idx),
            Some(_) => {}
        }
    }

    fn execute_on_ball(&mut self, idx: usize) {
        let intention = self.players[idx].intention;
        let from = self.players[idx].body.position;
        let player_id = self.players[idx].id;
        match intention.kind {
            IntentionKind::ShootAtGoal => {
                let team_index = self.players[idx].team_index;
                let target_side = self.teams[team_index].defending_side.opposite();
                let target = intention
                    .target_position
                    .unwrap_or_else(|| self.field.goal_center(target_side));
                let power = intention.power.unwrap_or(SHOT_POWER);
                self.last_touch = Some(player_id);
                self.events
                    .push(self.state.time_elapsed_ms, MatchEventKind::Shot { player_id });
                self.strike(from, target, power, power * SHOT_LOFT);
            }
            IntentionKind::PassToPlayer | IntentionKind::ClearBall | IntentionKind::TakeSetPiece => {
                if let Some(target) = intention.target_position {
                    let power = intention
                        .power
                        .unwrap_or_else(|| (from.distance_to(target) * 0.8).clamp(6.0, PASS_POWER_MAX));
                    self.last_touch = Some(player_id);
                    self.strike(from, target, power, power * 0.05);
                }
            }
            _ => {}
        }
    }

    fn strike(&mut self, from: Vec2, target: Vec2, power: f32, loft: f32) {
        let dir = (target - from).normalized();
        if dir == Vec2::ZERO {
            return;
        }
        let velocity = Vec3::new(dir.x * power, loft, dir.y * power);
        self.ball.kick(velocity, Vec3::ZERO);
        log::debug!("ball struck toward ({:.1}, {:.1}) at {power:.1} m/s", target.x, target.y);
    }

    /// Vision subscription body. Returns the interval to the next scan.
    pub fn vision_tick(&mut self, idx: usize) -> Tick {
        if idx >= self.players.len() {
            return self.config.cadence.ai_interval_ms;
        }
        self.perceived_scratch.clear();
        for (j, other) in self.players.iter().enumerate() {
            if j == idx {
                continue;
            }
            self.perceived_scratch.push(PerceivedPlayer {
                player_index: other.id,
                team_id: other.team_id,
                position: other.body.position,
                velocity: other.body.velocity,
            });
        }
        let ball_vel = self.ball.velocity();
        let ball = PerceivedBall {
            position: self.ball.position2d(),
            velocity: Vec2::new(ball_vel.x, ball_vel.z),
            height: self.ball.position().y,
        };
        let in_possession = self.state.possession == Some(self.players[idx].team_id);
        let freq = vision::scan_frequency_ms(&self.players[idx].attributes, in_possession);
        self.players[idx].vision.scan_frequency_ms = freq;
        self.players[idx]
            .vision
            .scan(self.perceived_scratch.drain(..), ball, &mut self.rng);
        freq.max(1)
    }

    /// AI subscription body: one fresh intention, plus the probabilistic
    /// destination glance.
    pub fn ai_tick(&mut self, idx: usize, now: Tick) {
        if idx >= self.players.len() {
            return;
        }
        let intention = super::player_decision::decide(self, idx);
        self.players[idx].intention = intention;
        if intention.wants_movement() && self.rng.chance(head::LOOK_AT_DESTINATION_CHANCE) {
            if let Some(dest) = intention.target_position {
                head_movement::look_at_destination(&mut self.players[idx].body, dest, now);
            }
        } else if intention.kind == IntentionKind::DribbleToPosition
            && self.rng.chance(head::CHECK_SHOULDER_CHANCE)
        {
            // Carriers glance over a shoulder for the chasing defender.
            let side = if self.rng.chance(0.5) { 1.0 } else { -1.0 };
            head_movement::check_shoulder(
                &mut self.players[idx].body,
                side,
                now,
                head::CHECK_SHOULDER_MS,
            );
        }
    }

    /// Per-tick hook: advance the clock and call full time.
    pub fn clock_tick(&mut self, tick: Tick) {
        self.state.time_elapsed_ms = tick;
        if !self.finished && tick >= self.match_length {
            self.finished = true;
            self.state.play_state = PlayState::FullTime;
            self.events.push(tick, MatchEventKind::FullTime);
            log::info!(
                "full time: {} {} - {} {}",
                self.teams[0].name,
                self.state.home_score,
                self.state.away_score,
                self.teams[1].name
            );
        }
    }

    // ------------------------------------------------------------------
    // External events
    // ------------------------------------------------------------------

    /// Apply an externally injected event. External input is untrusted, so
    /// lookup misses are logged and dropped instead of failing the drain.
    pub fn apply_external(&mut self, event: &ExternalEvent) {
        match event {
            ExternalEvent::Substitution { player_out_id, player_in_id, position_slot } => {
                self.apply_substitution(*player_out_id, *player_in_id, *position_slot);
            }
            ExternalEvent::TacticalChange { team_id, formation_id, instructions, mentality } => {
                if formation_id.is_some() {
                    log::debug!("formation swap requested; slot remapping is external");
                }
                let Some(team_index) = self.team_index_of(*team_id) else {
                    log::warn!("tactical change for unknown team {team_id}");
                    return;
                };
                if let Some(instructions) = instructions {
                    self.apply_instructions(team_index, instructions);
                }
                if let Some(mentality) = mentality {
                    let shift = match mentality {
                        super::events::Mentality::VeryDefensive => -6.0,
                        super::events::Mentality::Defensive => -3.0,
                        super::events::Mentality::Balanced => 0.0,
                        super::events::Mentality::Attacking => 3.0,
                        super::events::Mentality::VeryAttacking => 6.0,
                    };
                    let attack = self.teams[team_index].defending_side.attack_direction();
                    self.regions[team_index].translate(attack.x * shift, 0.0);
                }
            }
            ExternalEvent::Shout { player_id, shout } => {
                if let Some(idx) = self.player_index_by_id(*player_id) {
                    self.players[idx].last_shout = Some(*shout);
                    log::debug!("shout {shout:?} at player {player_id}");
                } else {
                    log::warn!("shout at unknown player {player_id}");
                }
            }
        }
    }

    fn apply_instructions(&mut self, team_index: usize, instructions: &TeamInstructions) {
        if let Some(width) = instructions.width {
            self.regions[team_index].set_tactical_width(width);
        }
        if let Some(shift) = instructions.line_shift_m {
            let attack = self.teams[team_index].defending_side.attack_direction();
            self.regions[team_index].translate(attack.x * shift, 0.0);
        }
    }

    /// Swap one fielded player for a bench player: the outgoing body is
    /// destroyed, the incoming one spawns on the slot.
    fn apply_substitution(&mut self, player_out: u32, player_in: u32, position_slot: Option<u8>) {
        let Some(idx) = self.player_index_by_id(player_out) else {
            log::warn!("substitution: player {player_out} is not on the pitch");
            return;
        };
        if self.player_index_by_id(player_in).is_some() {
            log::warn!("substitution: player {player_in} is already on the pitch");
            return;
        }
        let team_index = self.players[idx].team_index;
        let Some(profile) = self.teams[team_index].player(player_in).cloned() else {
            log::warn!("substitution: player {player_in} is not in the squad");
            return;
        };
        let slot = position_slot
            .and_then(|s| self.teams[team_index].lineup.get(s as usize))
            .map(|s| (s.sx, s.sy))
            .unwrap_or(self.players[idx].slot);
        if self.ball.held_by() == Some(player_out) {
            self.ball.release();
        }
        let spawn = if profile.role == PositionRole::Goalkeeper {
            self.keeper_home(team_index)
        } else {
            self.regions[team_index].slot_to_world(slot.0, slot.1)
        };
        let attack = self.teams[team_index].defending_side.attack_direction();
        let team_id = self.teams[team_index].id;
        if self.last_touch == Some(player_out) {
            self.last_touch = None;
        }
        self.events.push(
            self.state.time_elapsed_ms,
            MatchEventKind::Substitution { player_out_id: player_out, player_in_id: player_in },
        );
        log::info!("substitution: {player_out} off, {player_in} on");
        self.players[idx] = MatchPlayer {
            id: profile.id,
            team_id,
            team_index,
            role: profile.role,
            attributes: profile.attributes,
            slot,
            body: PlayerBody::new(spawn, attack),
            vision: PlayerVision::new(&profile.attributes),
            intention: Intention::idle(),
            last_shout: None,
        };
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Deterministic state fingerprint: serialize two of these from two
    /// runs and the bytes must match.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            tick: self.state.time_elapsed_ms,
            play_state: self.state.play_state,
            home_score: self.state.home_score,
            away_score: self.state.away_score,
            ball_position: self.ball.position(),
            ball_velocity: self.ball.velocity(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    position: p.body.position,
                    velocity: p.body.velocity,
                    head_angle: p.body.head_angle(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub head_angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: Tick,
    pub play_state: PlayState,
    pub home_score: u8,
    pub away_score: u8,
    pub ball_position: Vec3,
    pub ball_velocity: Vec3,
    pub players: Vec<PlayerSnapshot>,
}

/// Wire every repeating subscription into the scheduler. Offsets and
/// cadence jitter draw from the world RNG in a fixed order, so two worlds
/// built from the same seed subscribe identically.
pub fn initialize(world: &mut MatchWorld, sched: &mut EventScheduler<MatchWorld>) -> Result<()> {
    let physics_interval = world.config.cadence.physics_interval_ms;
    let ai_interval = world.config.cadence.ai_interval_ms;
    let ai_jitter = world.config.cadence.ai_jitter_ms;
    let ai_stagger = world.config.cadence.ai_stagger_ms.max(1);

    sched.set_on_tick(Box::new(|world: &mut MatchWorld, tick| world.clock_tick(tick)));

    sched.schedule(
        0,
        EventKind::BallPhysics,
        EventPayload::None,
        Box::new(move |world: &mut MatchWorld, sched, handle| {
            world.ball_tick();
            if !world.finished {
                sched.reschedule(&handle, physics_interval)?;
            }
            Ok(())
        }),
    );

    for idx in 0..world.players.len() {
        sched.schedule(
            0,
            EventKind::PlayerPhysics,
            EventPayload::Player(world.players[idx].id),
            Box::new(move |world: &mut MatchWorld, sched, handle| {
                world.physics_tick(idx, sched.current_tick());
                if !world.finished {
                    sched.reschedule(&handle, physics_interval)?;
                }
                Ok(())
            }),
        );

        sched.schedule(
            0,
            EventKind::Vision,
            EventPayload::Player(world.players[idx].id),
            Box::new(move |world: &mut MatchWorld, sched, handle| {
                let next = world.vision_tick(idx);
                if !world.finished {
                    sched.reschedule(&handle, next)?;
                }
                Ok(())
            }),
        );

        let stagger = world.rng.range_u32(0, ai_stagger - 1);
        sched.schedule(
            stagger,
            EventKind::PlayerAi,
            EventPayload::Player(world.players[idx].id),
            Box::new(move |world: &mut MatchWorld, sched, handle| {
                world.ai_tick(idx, sched.current_tick());
                if !world.finished {
                    let jitter = world.rng.jitter_i32(ai_jitter);
                    let interval = (ai_interval as i64 + i64::from(jitter)).max(1) as Tick;
                    sched.reschedule(&handle, interval)?;
                }
                Ok(())
            }),
        );
    }

    log::debug!(
        "match initialized: {} players, physics every {physics_interval} ms",
        world.players.len()
    );
    Ok(())
}
