//! Tank Arena - A top-down arena combat simulation
//!
//! Core modules:
//! - `sim`: Simulation (motion, collisions, progression, population)
//! - `tuning`: Data-driven world and population balance

pub mod sim;
pub mod tuning;

pub use tuning::{DensityPreset, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation rate for the headless runner (Hz)
    pub const SIM_HZ: u32 = 60;
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;

    /// Largest frame delta the tick will integrate (seconds)
    pub const MAX_TICK_DT: f32 = 0.05;

    /// Default world dimensions
    pub const WORLD_WIDTH: f32 = 4000.0;
    pub const WORLD_HEIGHT: f32 = 4000.0;

    /// Unzoomed view rectangle around the tank
    pub const BASE_VIEW_WIDTH: f32 = 1920.0;
    pub const BASE_VIEW_HEIGHT: f32 = 1080.0;

    // --- Tank ---
    pub const TANK_BASE_RADIUS: f32 = 25.0;
    /// Barrel length as a multiple of tank radius
    pub const BARREL_LENGTH: f32 = 1.9;
    /// How quickly velocity approaches the movement intent (1/s)
    pub const TANK_ACCELERATION: f32 = 8.0;
    pub const TANK_FLASH_DURATION: f32 = 0.15;

    // --- Progression ---
    pub const MAX_LEVEL: u32 = 45;
    pub const STAT_SLOTS: usize = 8;
    pub const MAX_STAT_VALUE: u8 = 7;
    /// Slots that may sit at MAX_STAT_VALUE at the same time
    pub const MAX_MAXED_SLOTS: usize = 4;
    pub const MAX_SKILL_POINTS: u32 = 33;
    /// Level up to which every level grants one point
    pub const SKILL_LINEAR_UNTIL_LEVEL: u32 = 28;
    pub const SKILL_BONUS_LEVEL: u32 = 30;
    pub const SKILL_EXTRA_START_LEVEL: u32 = 33;
    pub const SKILL_EXTRA_EVERY: u32 = 3;

    pub const SIZE_PER_LEVEL: f32 = 0.01;
    pub const ZOOM_PER_LEVEL: f32 = 0.005;

    pub const BASE_HEALTH: f32 = 50.0;
    pub const HEALTH_PER_LEVEL: f32 = 2.0;
    pub const HEALTH_PER_POINT: f32 = 20.0;

    pub const BASE_REGEN_FACTOR: f32 = 0.003;
    pub const REGEN_PER_POINT: f32 = 0.0045;
    /// Seconds without damage before hyper-regen kicks in
    pub const HYPER_REGEN_DELAY: f32 = 30.0;
    pub const HYPER_REGEN_FACTOR: f32 = 4.0;

    pub const BASE_BODY_DAMAGE: f32 = 20.0;
    pub const BODY_DAMAGE_PER_POINT: f32 = 6.0;
    pub const BODY_DAMAGE_SHAPE_FACTOR: f32 = 1.0;
    pub const BODY_DAMAGE_TANK_FACTOR: f32 = 0.25;
    pub const BODY_DAMAGE_PROJECTILE_FACTOR: f32 = 0.5;

    pub const BASE_BULLET_SPEED: f32 = 400.0;
    pub const BULLET_SPEED_PER_POINT: f32 = 0.1;
    pub const BASE_BULLET_DAMAGE: f32 = 7.0;
    pub const BULLET_DAMAGE_PER_POINT: f32 = 3.0;
    /// Damage divisor growth per unit of extra speed multiplier
    pub const BULLET_SPEED_DAMAGE_PENALTY: f32 = 0.5;
    pub const BASE_BULLET_HP: f32 = 5.0;
    pub const BULLET_HP_PER_POINT: f32 = 2.5;
    pub const BASE_BULLET_RADIUS: f32 = 10.0;
    pub const BULLET_LIFETIME: f32 = 2.5;
    /// Random spread applied to each shot (radians, +/-)
    pub const BULLET_SPREAD: f32 = 0.05;
    /// Bullets further than this outside the camera rectangle are culled
    pub const BULLET_CULL_MARGIN: f32 = 200.0;

    pub const BASE_RELOAD_TICKS: f32 = 15.0;
    pub const RELOAD_FACTOR: f32 = 0.914;
    /// Duration of one reload tick (seconds)
    pub const RELOAD_TICK_SECS: f32 = 1.0 / 25.0;

    pub const BASE_MOVE_SPEED: f32 = 240.0;
    pub const MOVE_SLOWDOWN_PER_LEVEL: f32 = 0.01;
    pub const MIN_LEVEL_SPEED_FACTOR: f32 = 0.6;
    pub const MOVE_SPEED_PER_POINT: f32 = 0.07;

    // --- Entities ---
    pub const SQUARE_SIZE: f32 = 40.0;
    pub const TRIANGLE_SIZE: f32 = 44.0;
    pub const SQUARE_MAX_HP: f32 = 10.0;
    pub const TRIANGLE_MAX_HP: f32 = 30.0;
    /// Penetration consumed from a bullet per hit
    pub const SQUARE_RESISTANCE: f32 = 2.0;
    pub const TRIANGLE_RESISTANCE: f32 = 4.0;
    /// Reward multiplier applied to max hp on kill
    pub const SQUARE_REWARD: f32 = 1.0;
    pub const TRIANGLE_REWARD: f32 = 2.5;
    /// Collision outline sits this far inside the drawn outline
    pub const COLLISION_INSET: f32 = 2.0;
    /// Squares use a circle of half-size times this factor against bullets
    pub const SQUARE_HIT_CIRCLE_FACTOR: f32 = 1.1;
    pub const ENTITY_DRIFT_SPEED: f32 = 12.0;
    pub const ENTITY_MAX_SPIN: f32 = 0.6;
    /// Kick decay rate (1/s)
    pub const KICK_FRICTION: f32 = 4.0;
    pub const ENTITY_FLASH_DURATION: f32 = 0.12;
    pub const DEATH_EFFECT_DURATION: f32 = 0.25;

    // --- Collision response ---
    pub const BULLET_KNOCKBACK: f32 = 60.0;
    pub const SEPARATION_KNOCKBACK: f32 = 40.0;
    pub const CONTACT_KNOCKBACK: f32 = 80.0;
    pub const CONTACT_BOUNCE: f32 = 120.0;
    pub const CONTACT_DAMAGE_PER_SEC: f32 = 30.0;
    /// Tank speed at which contact body damage doubles
    pub const CONTACT_SPEED_REFERENCE: f32 = 240.0;

    // --- Lifecycle ---
    pub const SPAWN_ATTEMPTS: u32 = 20;
    pub const SPAWN_NEAR_MIN_DIST: f32 = 60.0;
    pub const SPAWN_NEAR_MAX_DIST: f32 = 160.0;

    /// Small floor for degenerate lengths
    pub const GEOM_EPSILON: f32 = 1e-6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
    }

    #[test]
    fn test_polar_round_trip() {
        let p = polar_to_cartesian(10.0, PI / 3.0);
        let (r, theta) = cartesian_to_polar(p);
        assert!((r - 10.0).abs() < 1e-4);
        assert!((theta - PI / 3.0).abs() < 1e-5);
    }
}
