//! Fixed timestep simulation tick
//!
//! Advances the arena by one frame in a strict order: tank, entity motion and
//! player contact, entity separation, death bookkeeping, bullets, rewards.

use glam::Vec2;

use super::collision::{resolve_tank_contact, separate_entities};
use super::lifecycle::SpawnRequest;
use super::progression::DerivedStats;
use super::state::{
    DeathEffect, GameEvent, GameState, Kill, KillSource, Tank, fade_effects,
};
use crate::cartesian_to_polar;
use crate::consts::*;

/// Autopilot backs off from anything closer than this
const AUTOPILOT_RETREAT_DIST: f32 = 250.0;
/// ... and closes in on anything further than this
const AUTOPILOT_CHASE_DIST: f32 = 600.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; longer than 1 is clamped
    pub movement: Vec2,
    /// World-space point to aim the barrel at
    pub aim: Option<Vec2>,
    /// Fire whenever the reload allows
    pub fire_held: bool,
    /// Fire once this tick if loaded
    pub fire_pressed: bool,
    /// Demo mode - the tank hunts the nearest entity on its own
    pub autopilot: bool,
}

/// Input the autopilot would give for the current state
///
/// Aims and fires at the nearest live entity, keeping it between the
/// retreat and chase distances and circling it otherwise.
pub fn autopilot_input(state: &GameState) -> TickInput {
    let tank = state.tank.pos;
    let nearest = state
        .entities
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(tank)
                .total_cmp(&b.pos.distance_squared(tank))
        });

    let Some(target) = nearest else {
        return TickInput {
            movement: (state.world_center() - tank).normalize_or_zero(),
            ..Default::default()
        };
    };

    let to_target = target.pos - tank;
    let dir = to_target.normalize_or_zero();
    let dist = to_target.length();
    let movement = if dist < AUTOPILOT_RETREAT_DIST {
        -dir
    } else if dist > AUTOPILOT_CHASE_DIST {
        dir
    } else {
        dir.perp()
    };

    TickInput {
        movement,
        aim: Some(target.pos),
        fire_held: true,
        ..Default::default()
    }
}

/// Advance the game state by one frame
///
/// `dt` is clamped to the tuning's max tick delta. Entities that die this
/// tick leave a fade-out in `effects`; finished fades are dropped.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, effects: &mut Vec<DeathEffect>) {
    let dt = dt.clamp(0.0, state.tuning.max_tick_dt);

    fade_effects(effects, dt);
    state.begin_spawn_frame();
    state.events.clear();
    state.score_delta = 0;
    state.time_ticks += 1;

    let input = if input.autopilot {
        autopilot_input(state)
    } else {
        input.clone()
    };

    let stats = state.derived();
    step_tank(state, &input, &stats, dt);

    // Entity motion and player contact
    let world = state.world_size();
    let mut kills = Vec::new();
    for entity in &mut state.entities {
        entity.integrate(dt, world);
        if let Some(outcome) = resolve_tank_contact(&mut state.tank, &stats, entity, dt)
            && outcome.killed
        {
            kills.push(Kill::of(entity, KillSource::Contact));
        }
    }
    clamp_tank(&mut state.tank, stats.tank_radius(), world);

    separate_entities(&mut state.entities);
    for entity in &mut state.entities {
        entity.keep_in_bounds(world);
    }

    // Deaths first, so their replacements go ahead of reproduction
    let mut requests = Vec::new();
    remove_dead(state, effects, &mut requests);
    state.roll_reproduction(dt, &mut requests);
    state.process_spawn_requests(&mut requests);

    state.step_bullets(dt, &mut kills);
    remove_dead(state, effects, &mut requests);
    state.process_spawn_requests(&mut requests);
    state.top_up_population();

    settle_rewards(state, &kills);

    if state.tank.hp <= 0.0 {
        log::info!(
            "Tank destroyed at level {} with score {}",
            state.tank.level,
            state.score
        );
        state.events.push(GameEvent::TankDestroyed);
        let center = state.world_center();
        state.tank.respawn(center);
    }
}

/// Movement, aim, regeneration and firing
fn step_tank(state: &mut GameState, input: &TickInput, stats: &DerivedStats, dt: f32) {
    let world = state.world_size();
    let tank = &mut state.tank;

    let intent = input.movement.clamp_length_max(1.0) * stats.move_speed;
    tank.vel += (intent - tank.vel) * (TANK_ACCELERATION * dt).min(1.0);
    tank.pos += tank.vel * dt;
    clamp_tank(tank, stats.tank_radius(), world);

    if let Some(target) = input.aim {
        let (dist, angle) = cartesian_to_polar(target - tank.pos);
        if dist > GEOM_EPSILON {
            tank.angle = angle;
        }
    }

    tank.secs_since_damage += dt;
    let regen = stats.regen_rate(tank.secs_since_damage) * dt;
    tank.hp = (tank.hp + regen).clamp(0.0, stats.max_health);
    tank.flash = (tank.flash - dt).max(0.0);
    tank.fire_cooldown = (tank.fire_cooldown - dt).max(0.0);

    if (input.fire_held || input.fire_pressed) && tank.fire_cooldown <= 0.0 {
        tank.fire_cooldown = stats.reload_secs;
        state.fire_bullet(stats);
    }
}

/// Keep the whole tank body inside the world
fn clamp_tank(tank: &mut Tank, radius: f32, world: Vec2) {
    let lo = Vec2::splat(radius);
    let hi = (world - lo).max(lo);
    let clamped = tank.pos.clamp(lo, hi);
    if clamped.x != tank.pos.x {
        tank.vel.x = 0.0;
    }
    if clamped.y != tank.pos.y {
        tank.vel.y = 0.0;
    }
    tank.pos = clamped;
}

/// Drop dead entities, leaving a fade-out and a replacement request for each
fn remove_dead(
    state: &mut GameState,
    effects: &mut Vec<DeathEffect>,
    requests: &mut Vec<SpawnRequest>,
) {
    state.entities.retain(|e| {
        if e.is_alive() {
            return true;
        }
        effects.push(DeathEffect::from_entity(e));
        requests.push(SpawnRequest::Random(e.kind));
        false
    });
}

/// Pay out experience and score for this tick's kills
fn settle_rewards(state: &mut GameState, kills: &[Kill]) {
    for kill in kills {
        let reward = kill.reward();
        state.score += reward;
        state.score_delta += reward;
        state.events.push(GameEvent::EntityKilled {
            id: kill.entity_id,
            kind: kill.kind,
            source: kill.source,
        });

        if let Some(level) = state.tank.add_xp(reward) {
            log::info!("Level up: {}", level);
            state.events.push(GameEvent::LevelUp { level });
        }
    }
}
