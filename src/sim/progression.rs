//! Level and stat-point progression
//!
//! `derive_stats` turns (level, allocation) into every number the rest of the
//! simulation needs. Nothing here is stored between ticks.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The eight allocatable stats, in HUD order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatSlot {
    HealthRegen,
    MaxHealth,
    BodyDamage,
    BulletSpeed,
    BulletPenetration,
    BulletDamage,
    Reload,
    MovementSpeed,
}

impl StatSlot {
    pub const ALL: [StatSlot; STAT_SLOTS] = [
        StatSlot::HealthRegen,
        StatSlot::MaxHealth,
        StatSlot::BodyDamage,
        StatSlot::BulletSpeed,
        StatSlot::BulletPenetration,
        StatSlot::BulletDamage,
        StatSlot::Reload,
        StatSlot::MovementSpeed,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatSlot::HealthRegen => "Health Regen",
            StatSlot::MaxHealth => "Max Health",
            StatSlot::BodyDamage => "Body Damage",
            StatSlot::BulletSpeed => "Bullet Speed",
            StatSlot::BulletPenetration => "Bullet Penetration",
            StatSlot::BulletDamage => "Bullet Damage",
            StatSlot::Reload => "Reload",
            StatSlot::MovementSpeed => "Movement Speed",
        }
    }
}

/// Points spent per stat slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatAllocation {
    points: [u8; STAT_SLOTS],
}

impl StatAllocation {
    /// Build an allocation directly; fails if any slot exceeds the per-slot max
    pub fn from_points(points: [u8; STAT_SLOTS]) -> Option<Self> {
        points
            .iter()
            .all(|&p| p <= MAX_STAT_VALUE)
            .then_some(Self { points })
    }

    #[inline]
    pub fn get(&self, slot: StatSlot) -> u8 {
        self.points[slot.index()]
    }

    pub fn points(&self) -> &[u8; STAT_SLOTS] {
        &self.points
    }

    /// Total points spent
    pub fn spent(&self) -> u32 {
        self.points.iter().map(|&p| p as u32).sum()
    }

    /// Number of slots sitting at the per-slot maximum
    pub fn maxed_slots(&self) -> usize {
        self.points.iter().filter(|&&p| p == MAX_STAT_VALUE).count()
    }

    /// Unspent points for a tank at `level`
    pub fn available(&self, level: u32) -> u32 {
        total_skill_points_for_level(level).saturating_sub(self.spent())
    }

    /// Whether one more point may go into `slot` under a budget of `budget` points
    pub fn can_allocate_with_budget(&self, slot: StatSlot, budget: u32) -> bool {
        let current = self.get(slot);
        if current >= MAX_STAT_VALUE || self.spent() >= budget {
            return false;
        }
        // Filling this slot must not create a fifth maxed slot
        !(current + 1 == MAX_STAT_VALUE && self.maxed_slots() >= MAX_MAXED_SLOTS)
    }

    pub fn try_allocate_with_budget(&mut self, slot: StatSlot, budget: u32) -> bool {
        if !self.can_allocate_with_budget(slot, budget) {
            return false;
        }
        self.points[slot.index()] += 1;
        true
    }

    /// Spend one point on `slot` using the skill budget for `level`
    pub fn try_allocate(&mut self, slot: StatSlot, level: u32) -> bool {
        self.try_allocate_with_budget(slot, total_skill_points_for_level(level))
    }
}

/// Skill points granted by reaching `level`
///
/// One per level through level 28, a bonus point at 30, then one more every
/// three levels from 33, capped at `MAX_SKILL_POINTS`.
pub fn total_skill_points_for_level(level: u32) -> u32 {
    let level = level.max(1);
    let linear = (level - 1).min(SKILL_LINEAR_UNTIL_LEVEL - 1);
    let bonus = u32::from(level >= SKILL_BONUS_LEVEL);
    let extra = if level >= SKILL_EXTRA_START_LEVEL {
        (level - SKILL_EXTRA_START_LEVEL) / SKILL_EXTRA_EVERY + 1
    } else {
        0
    };
    (linear + bonus + extra).min(MAX_SKILL_POINTS)
}

/// Cumulative experience needed to reach `level`
pub fn xp_for_level(level: u32) -> u64 {
    let steps = level.clamp(1, MAX_LEVEL) - 1;
    (12.0 * (steps as f64).powf(1.7)).floor() as u64
}

/// Highest level reachable with `xp` experience
pub fn level_for_xp(xp: u64) -> u32 {
    (1..=MAX_LEVEL)
        .take_while(|&level| xp_for_level(level) <= xp)
        .last()
        .unwrap_or(1)
}

/// Numbers derived from level and allocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedStats {
    pub size_mult: f32,
    pub zoom_mult: f32,
    pub max_health: f32,
    /// Health per second before hyper-regen
    pub regen_per_sec: f32,
    pub body_damage_shape: f32,
    pub body_damage_tank: f32,
    pub body_damage_projectile: f32,
    pub bullet_speed_mult: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    /// Penetration budget of a fresh bullet
    pub bullet_hp: f32,
    pub bullet_radius: f32,
    pub reload_ticks: u32,
    pub reload_secs: f32,
    pub move_speed: f32,
}

impl DerivedStats {
    /// Regeneration rate given how long the tank has gone without damage
    pub fn regen_rate(&self, secs_since_damage: f32) -> f32 {
        if secs_since_damage >= HYPER_REGEN_DELAY {
            self.regen_per_sec * HYPER_REGEN_FACTOR
        } else {
            self.regen_per_sec
        }
    }

    pub fn tank_radius(&self) -> f32 {
        TANK_BASE_RADIUS * self.size_mult
    }
}

/// Compute the derived stat bundle
pub fn derive_stats(level: u32, allocation: &StatAllocation) -> DerivedStats {
    let level = level.clamp(1, MAX_LEVEL);
    let growth = (level - 1) as f32;
    let pts = |slot: StatSlot| allocation.get(slot) as f32;

    let size_mult = 1.0 + growth * SIZE_PER_LEVEL;
    let zoom_mult = 1.0 + growth * ZOOM_PER_LEVEL;

    let max_health =
        BASE_HEALTH + growth * HEALTH_PER_LEVEL + pts(StatSlot::MaxHealth) * HEALTH_PER_POINT;
    let regen_per_sec =
        max_health * (BASE_REGEN_FACTOR + REGEN_PER_POINT * pts(StatSlot::HealthRegen));

    let body_damage = BASE_BODY_DAMAGE + BODY_DAMAGE_PER_POINT * pts(StatSlot::BodyDamage);

    let bullet_speed_mult = 1.0 + BULLET_SPEED_PER_POINT * pts(StatSlot::BulletSpeed);
    let speed_penalty = 1.0 + BULLET_SPEED_DAMAGE_PENALTY * (bullet_speed_mult - 1.0);
    let bullet_damage =
        (BASE_BULLET_DAMAGE + BULLET_DAMAGE_PER_POINT * pts(StatSlot::BulletDamage)) / speed_penalty;
    let bullet_hp = BASE_BULLET_HP + BULLET_HP_PER_POINT * pts(StatSlot::BulletPenetration);

    // Whole ticks only: the curve is stepped on purpose
    let reload_ticks =
        (BASE_RELOAD_TICKS * RELOAD_FACTOR.powi(allocation.get(StatSlot::Reload) as i32)).ceil()
            as u32;

    let level_speed = (1.0 - growth * MOVE_SLOWDOWN_PER_LEVEL).max(MIN_LEVEL_SPEED_FACTOR);
    let move_speed =
        BASE_MOVE_SPEED * level_speed * (1.0 + MOVE_SPEED_PER_POINT * pts(StatSlot::MovementSpeed));

    DerivedStats {
        size_mult,
        zoom_mult,
        max_health,
        regen_per_sec,
        body_damage_shape: body_damage * BODY_DAMAGE_SHAPE_FACTOR,
        body_damage_tank: body_damage * BODY_DAMAGE_TANK_FACTOR,
        body_damage_projectile: body_damage * BODY_DAMAGE_PROJECTILE_FACTOR,
        bullet_speed_mult,
        bullet_speed: BASE_BULLET_SPEED * bullet_speed_mult,
        bullet_damage,
        bullet_hp,
        bullet_radius: BASE_BULLET_RADIUS * size_mult,
        reload_ticks,
        reload_secs: reload_ticks as f32 * RELOAD_TICK_SECS,
        move_speed,
    }
}
