//! Simulation state and core types
//!
//! `GameState` owns every live entity, bullet and the tank. Other components
//! borrow into it for the duration of one call and refer to objects by id
//! across ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Polygon, Shape, ShapeKind, polygon_vertices};
use super::progression::{DerivedStats, StatAllocation, StatSlot, derive_stats, level_for_xp};
use super::spatial::SpatialHash;
use crate::Tuning;
use crate::consts::*;
use crate::normalize_angle;

impl ShapeKind {
    /// Visual size of a freshly spawned entity
    pub fn base_size(&self) -> f32 {
        match self {
            ShapeKind::Square => SQUARE_SIZE,
            ShapeKind::Triangle => TRIANGLE_SIZE,
        }
    }

    pub fn base_max_hp(&self) -> f32 {
        match self {
            ShapeKind::Square => SQUARE_MAX_HP,
            ShapeKind::Triangle => TRIANGLE_MAX_HP,
        }
    }

    /// Penetration a bullet spends on each hit
    pub fn resistance(&self) -> f32 {
        match self {
            ShapeKind::Square => SQUARE_RESISTANCE,
            ShapeKind::Triangle => TRIANGLE_RESISTANCE,
        }
    }

    pub fn reward_multiplier(&self) -> f32 {
        match self {
            ShapeKind::Square => SQUARE_REWARD,
            ShapeKind::Triangle => TRIANGLE_REWARD,
        }
    }
}

/// A polygonal creature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: ShapeKind,
    pub pos: Vec2,
    /// Steady drift velocity
    pub drift: Vec2,
    /// Knockback velocity, decays under friction
    pub kick: Vec2,
    pub angle: f32,
    pub angular_vel: f32,
    /// Visual size; collision uses an inset outline
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Hit-flash seconds remaining
    pub flash: f32,
}

impl Entity {
    pub fn new(id: u32, kind: ShapeKind, pos: Vec2, size: f32, max_hp: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            drift: Vec2::ZERO,
            kick: Vec2::ZERO,
            angle: 0.0,
            angular_vel: 0.0,
            size,
            hp: max_hp,
            max_hp,
            flash: 0.0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Collision outline in local space
    pub fn collision_shape(&self) -> Shape {
        Shape::inset(self.kind, self.size, COLLISION_INSET)
    }

    /// Collision outline in world space
    pub fn collision_polygon(&self) -> Polygon {
        polygon_vertices(&self.collision_shape(), self.pos, self.angle)
    }

    /// Apply damage and arm the hit flash. Returns true if this hit killed it.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        self.flash = ENTITY_FLASH_DURATION;
        was_alive && !self.is_alive()
    }

    /// Drift, kick decay, spin and wall bounce
    pub fn integrate(&mut self, dt: f32, world: Vec2) {
        self.pos += (self.drift + self.kick) * dt;
        self.kick *= (-KICK_FRICTION * dt).exp();
        self.angle = normalize_angle(self.angle + self.angular_vel * dt);
        self.flash = (self.flash - dt).max(0.0);
        self.keep_in_bounds(world);
    }

    /// Clamp into the world and turn drift away from any wall touched
    pub fn keep_in_bounds(&mut self, world: Vec2) {
        let half = self.size * 0.5;
        if self.pos.x < half {
            self.pos.x = half;
            self.drift.x = self.drift.x.abs();
        } else if self.pos.x > world.x - half {
            self.pos.x = world.x - half;
            self.drift.x = -self.drift.x.abs();
        }
        if self.pos.y < half {
            self.pos.y = half;
            self.drift.y = self.drift.y.abs();
        } else if self.pos.y > world.y - half {
            self.pos.y = world.y - half;
            self.drift.y = -self.drift.y.abs();
        }
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Seconds left before expiry
    pub lifetime: f32,
    /// Remaining penetration budget
    pub hp: f32,
    pub damage: f32,
}

impl Bullet {
    #[inline]
    pub fn is_spent(&self) -> bool {
        self.lifetime <= 0.0 || self.hp <= 0.0
    }
}

/// The player's tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Barrel angle (radians)
    pub angle: f32,
    pub hp: f32,
    pub flash: f32,
    pub fire_cooldown: f32,
    pub secs_since_damage: f32,
    pub level: u32,
    pub xp: u64,
    pub allocation: StatAllocation,
}

impl Tank {
    pub fn new(pos: Vec2) -> Self {
        let allocation = StatAllocation::default();
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            hp: derive_stats(1, &allocation).max_health,
            flash: 0.0,
            fire_cooldown: 0.0,
            secs_since_damage: 0.0,
            level: 1,
            xp: 0,
            allocation,
        }
    }

    pub fn stats(&self) -> DerivedStats {
        derive_stats(self.level, &self.allocation)
    }

    pub fn take_damage(&mut self, amount: f32, max_health: f32) {
        self.hp = (self.hp - amount).clamp(0.0, max_health);
        self.flash = TANK_FLASH_DURATION;
        self.secs_since_damage = 0.0;
    }

    /// Add experience; returns the new level if it went up
    pub fn add_xp(&mut self, amount: u64) -> Option<u32> {
        self.xp = self.xp.saturating_add(amount);
        let level = level_for_xp(self.xp);
        (level > self.level).then(|| {
            self.level = level;
            level
        })
    }

    /// Back to full health at `pos`; progression is kept
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.hp = self.stats().max_health;
        self.flash = 0.0;
        self.fire_cooldown = 0.0;
        self.secs_since_damage = 0.0;
    }
}

/// One-shot fade-out left behind by a dead entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathEffect {
    pub entity_id: u32,
    pub kind: ShapeKind,
    pub pos: Vec2,
    pub angle: f32,
    pub size: f32,
    /// Seconds of fade left
    pub remaining: f32,
}

impl DeathEffect {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id,
            kind: entity.kind,
            pos: entity.pos,
            angle: entity.angle,
            size: entity.size,
            remaining: DEATH_EFFECT_DURATION,
        }
    }

    /// Fade progress from 0 (fresh) to 1 (gone)
    pub fn progress(&self) -> f32 {
        (1.0 - self.remaining / DEATH_EFFECT_DURATION).clamp(0.0, 1.0)
    }
}

/// Age effects and drop finished ones
pub fn fade_effects(effects: &mut Vec<DeathEffect>, dt: f32) {
    effects.retain_mut(|e| {
        e.remaining -= dt;
        e.remaining > 0.0
    });
}

/// What finished off an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillSource {
    Bullet,
    Contact,
}

/// A kill waiting for reward settlement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub entity_id: u32,
    pub kind: ShapeKind,
    pub max_hp: f32,
    pub source: KillSource,
}

impl Kill {
    pub fn of(entity: &Entity, source: KillSource) -> Self {
        Self {
            entity_id: entity.id,
            kind: entity.kind,
            max_hp: entity.max_hp,
            source,
        }
    }

    /// Experience and score granted for this kill
    pub fn reward(&self) -> u64 {
        (self.max_hp * self.kind.reward_multiplier()).round() as u64
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntityKilled {
        id: u32,
        kind: ShapeKind,
        source: KillSource,
    },
    LevelUp {
        level: u32,
    },
    StatAllocated {
        slot: StatSlot,
        value: u8,
    },
    TankDestroyed,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub rng: Pcg32,
    /// Ticks simulated so far
    pub time_ticks: u64,
    pub tank: Tank,
    pub entities: Vec<Entity>,
    pub bullets: Vec<Bullet>,
    pub score: u64,
    /// Score gained during the last tick
    pub score_delta: u64,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
    /// Spawn attempts left this frame
    pub(crate) spawn_budget: u32,
    pub(crate) spatial: SpatialHash,
    next_id: u32,
}

impl GameState {
    /// New game with OS-seeded randomness and an initial population
    pub fn new(tuning: Tuning) -> Self {
        let mut state = Self::empty(tuning, Pcg32::from_os_rng());
        state.populate();
        state
    }

    /// New game with a fixed seed and an initial population
    pub fn with_seed(tuning: Tuning, seed: u64) -> Self {
        let mut state = Self::empty(tuning, Pcg32::seed_from_u64(seed));
        state.populate();
        state
    }

    /// Tank only, no creatures
    pub fn empty(tuning: Tuning, rng: Pcg32) -> Self {
        let center = Vec2::new(tuning.world_width, tuning.world_height) * 0.5;
        let spawn_budget = tuning.max_spawns_per_frame;
        Self {
            tuning,
            rng,
            time_ticks: 0,
            tank: Tank::new(center),
            entities: Vec::new(),
            bullets: Vec::new(),
            score: 0,
            score_delta: 0,
            events: Vec::new(),
            spawn_budget,
            spatial: SpatialHash::new(),
            next_id: 1,
        }
    }

    /// Allocate a new object ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.tuning.world_width, self.tuning.world_height)
    }

    pub fn world_center(&self) -> Vec2 {
        self.world_size() * 0.5
    }

    pub fn derived(&self) -> DerivedStats {
        self.tank.stats()
    }

    pub fn count_of(&self, kind: ShapeKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Spend one skill point on `slot`. Invalid requests are a no-op returning false.
    pub fn allocate_stat_point(&mut self, slot: StatSlot) -> bool {
        if !self.tank.allocation.try_allocate(slot, self.tank.level) {
            log::debug!("Rejected stat point for {}", slot.as_str());
            return false;
        }
        let value = self.tank.allocation.get(slot);
        log::info!("{} -> {}", slot.as_str(), value);
        self.events.push(GameEvent::StatAllocated { slot, value });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_clamps_and_flashes() {
        let mut e = Entity::new(1, ShapeKind::Square, Vec2::ZERO, 40.0, 10.0);
        assert!(!e.take_damage(4.0));
        assert_eq!(e.hp, 6.0);
        assert_eq!(e.flash, ENTITY_FLASH_DURATION);
        assert!(e.take_damage(100.0));
        assert_eq!(e.hp, 0.0);
        // Already dead: not a second kill
        assert!(!e.take_damage(1.0));
        // Negative damage never overheals
        let mut e = Entity::new(2, ShapeKind::Square, Vec2::ZERO, 40.0, 10.0);
        e.take_damage(-5.0);
        assert_eq!(e.hp, 10.0);
    }

    #[test]
    fn test_entity_bounces_off_walls() {
        let mut e = Entity::new(1, ShapeKind::Square, Vec2::new(25.0, 500.0), 40.0, 10.0);
        e.drift = Vec2::new(-100.0, 0.0);
        e.integrate(0.1, Vec2::splat(1000.0));
        assert_eq!(e.pos.x, 20.0);
        assert!(e.drift.x > 0.0);
    }

    #[test]
    fn test_kick_decays() {
        let mut e = Entity::new(1, ShapeKind::Square, Vec2::splat(500.0), 40.0, 10.0);
        e.kick = Vec2::new(100.0, 0.0);
        e.integrate(0.1, Vec2::splat(1000.0));
        assert!(e.kick.x < 100.0 && e.kick.x > 0.0);
    }

    #[test]
    fn test_tank_level_up() {
        let mut tank = Tank::new(Vec2::ZERO);
        assert_eq!(tank.add_xp(0), None);
        let xp = super::super::progression::xp_for_level(5);
        assert_eq!(tank.add_xp(xp), Some(5));
        assert_eq!(tank.level, 5);
    }

    #[test]
    fn test_tank_damage_clamps() {
        let mut tank = Tank::new(Vec2::ZERO);
        let max = tank.stats().max_health;
        tank.take_damage(max * 2.0, max);
        assert_eq!(tank.hp, 0.0);
        tank.respawn(Vec2::ONE);
        assert_eq!(tank.hp, max);
    }

    #[test]
    fn test_fade_effects() {
        let e = Entity::new(7, ShapeKind::Triangle, Vec2::ZERO, 44.0, 30.0);
        let mut effects = vec![DeathEffect::from_entity(&e)];
        fade_effects(&mut effects, DEATH_EFFECT_DURATION * 0.5);
        assert_eq!(effects.len(), 1);
        assert!((effects[0].progress() - 0.5).abs() < 1e-5);
        fade_effects(&mut effects, DEATH_EFFECT_DURATION);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_kill_reward() {
        let sq = Entity::new(1, ShapeKind::Square, Vec2::ZERO, 40.0, SQUARE_MAX_HP);
        let tri = Entity::new(2, ShapeKind::Triangle, Vec2::ZERO, 44.0, TRIANGLE_MAX_HP);
        assert_eq!(Kill::of(&sq, KillSource::Bullet).reward(), 10);
        assert_eq!(Kill::of(&tri, KillSource::Contact).reward(), 75);
    }

    #[test]
    fn test_allocate_stat_point_command() {
        let mut state = GameState::empty(Tuning::default(), Pcg32::seed_from_u64(1));
        assert!(!state.allocate_stat_point(StatSlot::Reload));
        state.tank.add_xp(super::super::progression::xp_for_level(3));
        assert!(state.allocate_stat_point(StatSlot::Reload));
        assert!(state.allocate_stat_point(StatSlot::Reload));
        assert!(!state.allocate_stat_point(StatSlot::Reload));
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::StatAllocated {
                slot: StatSlot::Reload,
                value: 2
            })
        );
    }
}
