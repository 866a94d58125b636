//! Projectiles: firing, motion, hits and culling

use glam::Vec2;
use rand::Rng;

use super::collision::{bullet_hits_entity, resolve_bullet_hit};
use super::progression::DerivedStats;
use super::state::{Bullet, GameState, Kill, KillSource};
use crate::consts::*;

impl GameState {
    /// Spawn one bullet from the barrel tip along the tank's aim
    pub fn fire_bullet(&mut self, stats: &DerivedStats) -> u32 {
        let spread = self.rng.random_range(-BULLET_SPREAD..=BULLET_SPREAD);
        let dir = Vec2::from_angle(self.tank.angle + spread);
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            pos: self.tank.pos + dir * (stats.tank_radius() * BARREL_LENGTH),
            vel: dir * stats.bullet_speed,
            radius: stats.bullet_radius,
            lifetime: BULLET_LIFETIME,
            hp: stats.bullet_hp,
            damage: stats.bullet_damage,
        });
        id
    }

    /// Move bullets, resolve hits against entities, cull spent ones
    ///
    /// Each bullet scans the 3x3 cells around it and stops at its first hit
    /// this tick. Kills are appended to `kills`; dead entities are left in
    /// place for the caller's batch removal.
    pub fn step_bullets(&mut self, dt: f32, kills: &mut Vec<Kill>) {
        for bullet in &mut self.bullets {
            bullet.pos += bullet.vel * dt;
            bullet.lifetime -= dt;
        }

        let largest_radius = self.bullets.iter().map(|b| b.radius).fold(0.0, f32::max);
        self.spatial.rebuild(&self.entities, largest_radius);

        let mut candidates = Vec::new();
        for bullet in &mut self.bullets {
            if bullet.is_spent() {
                continue;
            }
            self.spatial.query_neighborhood(bullet.pos, &mut candidates);
            for &index in &candidates {
                let entity = &mut self.entities[index];
                if !entity.is_alive() || !bullet_hits_entity(bullet, entity) {
                    continue;
                }
                let hit = resolve_bullet_hit(bullet, entity);
                if hit.killed {
                    kills.push(Kill::of(entity, KillSource::Bullet));
                }
                break;
            }
        }

        let camera = self.camera();
        self.bullets
            .retain(|b| !b.is_spent() && camera.contains(b.pos, BULLET_CULL_MARGIN));
    }
}
