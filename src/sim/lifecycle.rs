//! Entity population: spawning, caps and per-frame throttling
//!
//! Every spawn path checks the per-kind cap and the tank safe radius. A failed
//! spawn never mutates state; callers just try again on a later tick.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::geometry::ShapeKind;
use super::state::{Entity, GameState};
use crate::consts::*;
use crate::polar_to_cartesian;

/// A deferred spawn, processed under the frame's spawn budget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    /// Anywhere in the world (replacement for a death)
    Random(ShapeKind),
    /// Near a parent entity (reproduction)
    Near { kind: ShapeKind, origin: Vec2 },
}

fn random_in<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) * 0.5
    }
}

impl GameState {
    /// Whether `pos` is a legal spawn point for an entity of `size`
    fn spawn_point_ok(&self, pos: Vec2, size: f32) -> bool {
        let half = size * 0.5;
        let world = self.world_size();
        let in_bounds = pos.x >= half
            && pos.y >= half
            && pos.x <= world.x - half
            && pos.y <= world.y - half;
        in_bounds && pos.distance(self.tank.pos) >= self.tuning.spawn_safe_radius
    }

    fn at_cap(&self, kind: ShapeKind) -> bool {
        self.count_of(kind) >= self.tuning.cap_for(kind)
    }

    /// Create an entity at `pos` with random drift and spin
    fn insert_entity(&mut self, kind: ShapeKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let mut entity = Entity::new(id, kind, pos, kind.base_size(), kind.base_max_hp());
        entity.angle = random_in(&mut self.rng, -std::f32::consts::PI, std::f32::consts::PI);
        entity.angular_vel = random_in(&mut self.rng, -ENTITY_MAX_SPIN, ENTITY_MAX_SPIN);
        let heading = random_in(&mut self.rng, 0.0, TAU);
        let speed = random_in(&mut self.rng, 0.3, 1.0) * ENTITY_DRIFT_SPEED;
        entity.drift = polar_to_cartesian(speed, heading);
        self.entities.push(entity);
        id
    }

    /// Place an entity at a uniformly random point away from the tank
    ///
    /// Gives up after `SPAWN_ATTEMPTS` rejected placements. Returns false (and
    /// changes nothing) on failure or when the kind is at its cap.
    pub fn spawn_random(&mut self, kind: ShapeKind) -> bool {
        if self.at_cap(kind) {
            return false;
        }

        let half = kind.base_size() * 0.5;
        let world = self.world_size();
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = Vec2::new(
                random_in(&mut self.rng, half, world.x - half),
                random_in(&mut self.rng, half, world.y - half),
            );
            if self.spawn_point_ok(pos, kind.base_size()) {
                self.insert_entity(kind, pos);
                return true;
            }
        }

        log::debug!(
            "spawn_random({}) gave up after {} attempts",
            kind.as_str(),
            SPAWN_ATTEMPTS
        );
        false
    }

    /// Single attempt to place an entity in an annulus around `origin`
    pub fn spawn_near(&mut self, kind: ShapeKind, origin: Vec2) -> bool {
        if self.at_cap(kind) {
            return false;
        }

        let dist = random_in(&mut self.rng, SPAWN_NEAR_MIN_DIST, SPAWN_NEAR_MAX_DIST);
        let theta = random_in(&mut self.rng, 0.0, TAU);
        let pos = origin + polar_to_cartesian(dist, theta);
        if !self.spawn_point_ok(pos, kind.base_size()) {
            return false;
        }
        self.insert_entity(kind, pos);
        true
    }

    /// Fill every kind up to its target population, ignoring the frame budget
    pub fn populate(&mut self) {
        for kind in ShapeKind::ALL {
            let target = self.tuning.target_for(kind);
            let mut failures = 0;
            while self.count_of(kind) < target && failures < SPAWN_ATTEMPTS {
                if !self.spawn_random(kind) {
                    failures += 1;
                }
            }
            log::info!("Seeded {} {}s", self.count_of(kind), kind.as_str());
        }
    }

    /// Reset the per-frame spawn budget
    pub(crate) fn begin_spawn_frame(&mut self) {
        self.spawn_budget = self.tuning.max_spawns_per_frame;
    }

    /// Spawn attempts left this frame
    pub fn spawn_budget(&self) -> u32 {
        self.spawn_budget
    }

    /// Run one request if the frame budget allows
    pub fn try_spawn(&mut self, request: SpawnRequest) -> bool {
        if self.spawn_budget == 0 {
            return false;
        }
        self.spawn_budget -= 1;
        match request {
            SpawnRequest::Random(kind) => self.spawn_random(kind),
            SpawnRequest::Near { kind, origin } => self.spawn_near(kind, origin),
        }
    }

    /// Drain queued requests; whatever the budget can't cover is dropped
    pub fn process_spawn_requests(&mut self, requests: &mut Vec<SpawnRequest>) -> usize {
        let mut spawned = 0;
        let total = requests.len();
        for (i, request) in requests.drain(..).enumerate() {
            if self.spawn_budget == 0 {
                log::debug!("Spawn budget exhausted, dropped {} requests", total - i);
                break;
            }
            if self.try_spawn(request) {
                spawned += 1;
            }
        }
        spawned
    }

    /// Random spawns for kinds below their target, within the frame budget
    pub fn top_up_population(&mut self) {
        for kind in ShapeKind::ALL {
            while self.spawn_budget > 0 && self.count_of(kind) < self.tuning.target_for(kind) {
                if !self.try_spawn(SpawnRequest::Random(kind)) {
                    break;
                }
            }
        }
    }

    /// Roll reproduction for every entity: chance `rate * dt` each, independently
    pub fn roll_reproduction(&mut self, dt: f32, requests: &mut Vec<SpawnRequest>) {
        for i in 0..self.entities.len() {
            let (kind, origin) = (self.entities[i].kind, self.entities[i].pos);
            let chance = self.tuning.reproduction_rate(kind) * dt;
            if self.rng.random::<f32>() < chance {
                requests.push(SpawnRequest::Near { kind, origin });
            }
        }
    }
}
