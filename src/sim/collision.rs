//! Narrow-phase collision tests and responses
//!
//! Three independent rules, all against the inset collision outline:
//! bullet vs entity (damage + penetration), entity vs entity (SAT push-apart)
//! and entity vs tank (contact damage + push-back).

use glam::Vec2;

use super::geometry::{Shape, circle_intersects_polygon, closest_point_on_polygon, sat_mtv};
use super::progression::DerivedStats;
use super::state::{Bullet, Entity, Tank};
use crate::consts::*;

/// Result of a circle-vs-shape contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the shape (if hit)
    pub point: Vec2,
    /// Unit normal pointing from the shape toward the circle centre
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Damage a bullet deals to a target of the given resistance
///
/// A bullet whose remaining budget is below the resistance deals a
/// proportional share. Equal budget and resistance deal full damage.
#[inline]
pub fn penetration_damage(damage: f32, bullet_hp: f32, resistance: f32) -> f32 {
    if bullet_hp < resistance {
        damage * (bullet_hp / resistance).max(0.0)
    } else {
        damage
    }
}

/// Broad bullet-vs-entity overlap test
///
/// Squares are close enough to a circle that a slightly inflated circle does;
/// triangles get the exact circle-vs-polygon test.
pub fn bullet_hits_entity(bullet: &Bullet, entity: &Entity) -> bool {
    match entity.collision_shape() {
        Shape::Square { half_extent } => {
            let reach = half_extent * SQUARE_HIT_CIRCLE_FACTOR + bullet.radius;
            bullet.pos.distance_squared(entity.pos) <= reach * reach
        }
        Shape::Triangle { .. } => circle_intersects_polygon(
            bullet.pos,
            bullet.radius,
            entity.collision_polygon().vertices(),
        ),
    }
}

/// Outcome of a bullet striking an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletHit {
    pub damage: f32,
    pub killed: bool,
    /// Penetration budget ran out; the bullet is destroyed
    pub bullet_spent: bool,
}

/// Apply damage, penetration cost, knockback and hit flash for one hit
pub fn resolve_bullet_hit(bullet: &mut Bullet, entity: &mut Entity) -> BulletHit {
    let resistance = entity.kind.resistance();
    let damage = penetration_damage(bullet.damage, bullet.hp, resistance);
    bullet.hp -= resistance;

    let killed = entity.take_damage(damage);

    let away = (entity.pos - bullet.pos)
        .try_normalize()
        .or_else(|| bullet.vel.try_normalize())
        .unwrap_or(Vec2::ZERO);
    entity.kick += away * BULLET_KNOCKBACK;

    BulletHit {
        damage,
        killed,
        bullet_spent: bullet.hp <= 0.0,
    }
}

/// Push apart every overlapping pair of entities
///
/// O(n²) over entities only; the population is bounded by the density caps.
/// Each entity of a pair moves half the MTV and both receive equal and
/// opposite kicks along its normal. Returns the number of pairs resolved.
pub fn separate_entities(entities: &mut [Entity]) -> usize {
    let mut polys: Vec<_> = entities.iter().map(Entity::collision_polygon).collect();
    let reach: Vec<f32> = entities
        .iter()
        .map(|e| e.collision_shape().bounding_radius())
        .collect();
    let mut resolved = 0;

    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let (head, tail) = entities.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            if !a.is_alive() || !b.is_alive() {
                continue;
            }
            let max_dist = reach[i] + reach[j];
            if a.pos.distance_squared(b.pos) > max_dist * max_dist {
                continue;
            }

            let Some(mtv) = sat_mtv(polys[i].vertices(), polys[j].vertices(), a.pos, b.pos)
            else {
                continue;
            };

            let push = mtv.normal * (mtv.overlap * 0.5);
            a.pos -= push;
            b.pos += push;
            a.kick -= mtv.normal * SEPARATION_KNOCKBACK;
            b.kick += mtv.normal * SEPARATION_KNOCKBACK;

            polys[i] = a.collision_polygon();
            polys[j] = b.collision_polygon();
            resolved += 1;
        }
    }
    resolved
}

/// Tank circle against an entity's collision outline
pub fn tank_entity_contact(tank_pos: Vec2, tank_radius: f32, entity: &Entity) -> CollisionResult {
    let poly = entity.collision_polygon();
    let closest = closest_point_on_polygon(tank_pos, poly.vertices());

    if closest == tank_pos {
        // Tank centre is inside the outline; push out along the centre line
        let normal = (tank_pos - entity.pos).try_normalize().unwrap_or(Vec2::X);
        return CollisionResult {
            hit: true,
            point: tank_pos,
            normal,
            penetration: tank_radius,
        };
    }

    let delta = tank_pos - closest;
    let dist_sq = delta.length_squared();
    if dist_sq > tank_radius * tank_radius {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    CollisionResult {
        hit: true,
        point: closest,
        normal: delta / dist.max(GEOM_EPSILON),
        penetration: tank_radius - dist,
    }
}

/// Outcome of tank/entity contact for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactOutcome {
    pub tank_damage: f32,
    pub entity_damage: f32,
    pub killed: bool,
}

/// Resolve tank-vs-entity contact over `dt`
///
/// Position correction is split evenly. The tank bounces, the entity is
/// kicked, and both take damage scaled by `dt`; the entity's share grows
/// with the tank's speed.
pub fn resolve_tank_contact(
    tank: &mut Tank,
    stats: &DerivedStats,
    entity: &mut Entity,
    dt: f32,
) -> Option<ContactOutcome> {
    if !entity.is_alive() {
        return None;
    }
    let contact = tank_entity_contact(tank.pos, stats.tank_radius(), entity);
    if !contact.hit {
        return None;
    }

    let speed = tank.vel.length();

    let correction = contact.normal * (contact.penetration * 0.5);
    tank.pos += correction;
    entity.pos -= correction;
    tank.vel += contact.normal * CONTACT_BOUNCE;
    entity.kick -= contact.normal * CONTACT_KNOCKBACK;

    let tank_damage = CONTACT_DAMAGE_PER_SEC * dt;
    tank.take_damage(tank_damage, stats.max_health);

    let entity_damage = stats.body_damage_shape * (1.0 + speed / CONTACT_SPEED_REFERENCE) * dt;
    let killed = entity.take_damage(entity_damage);

    Some(ContactOutcome {
        tank_damage,
        entity_damage,
        killed,
    })
}
