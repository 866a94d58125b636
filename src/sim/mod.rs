//! Arena simulation module
//!
//! All gameplay logic lives here. Given the same seed, tuning and inputs a
//! run is reproducible:
//! - Frame delta clamped, never integrated in one huge step
//! - Seeded RNG owned by `GameState`
//! - Stable iteration order (entity vector order, fixed 3x3 cell scan)
//! - No rendering or platform dependencies

pub mod bullets;
pub mod collision;
pub mod geometry;
pub mod lifecycle;
pub mod progression;
pub mod snapshot;
pub mod spatial;
pub mod state;
pub mod tick;

pub use collision::{
    BulletHit, CollisionResult, ContactOutcome, bullet_hits_entity, penetration_damage,
    resolve_bullet_hit, resolve_tank_contact, separate_entities, tank_entity_contact,
};
pub use geometry::{
    Mtv, Polygon, Shape, ShapeKind, circle_intersects_polygon, closest_point_on_polygon,
    closest_point_on_segment, point_in_polygon, polygon_vertices, sat_mtv,
};
pub use lifecycle::SpawnRequest;
pub use progression::{
    DerivedStats, StatAllocation, StatSlot, derive_stats, level_for_xp,
    total_skill_points_for_level, xp_for_level,
};
pub use snapshot::{BulletView, CameraRect, EntityView, HudTelemetry, Snapshot, TankView};
pub use spatial::SpatialHash;
pub use state::{
    Bullet, DeathEffect, Entity, GameEvent, GameState, Kill, KillSource, Tank, fade_effects,
};
pub use tick::{TickInput, autopilot_input, tick};
