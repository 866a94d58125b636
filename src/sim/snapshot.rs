//! Read-only views of a completed tick for the renderer and HUD

use glam::Vec2;
use serde::Serialize;

use super::geometry::ShapeKind;
use super::progression::{total_skill_points_for_level, xp_for_level};
use super::state::GameState;
use crate::consts::{MAX_LEVEL, STAT_SLOTS};

/// Visible world rectangle, centred on the tank
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraRect {
    /// Top-left corner in world space
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl CameraRect {
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            pos: center - Vec2::new(width, height) * 0.5,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width, self.height) * 0.5
    }

    /// Whether `p` lies inside the rectangle grown by `margin` on every side
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= self.pos.x - margin
            && p.y >= self.pos.y - margin
            && p.x <= self.pos.x + self.width + margin
            && p.y <= self.pos.y + self.height + margin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: ShapeKind,
    pub pos: Vec2,
    pub angle: f32,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub flash: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TankView {
    pub pos: Vec2,
    pub angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub flash: f32,
    pub size_mult: f32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub entities: Vec<EntityView>,
    pub bullets: Vec<BulletView>,
    pub tank: TankView,
    pub camera: CameraRect,
}

/// Progression numbers for the HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudTelemetry {
    pub score: u64,
    pub score_delta: u64,
    pub level: u32,
    pub xp: u64,
    /// Experience at which the current level started
    pub xp_level_start: u64,
    /// Experience needed for the next level; None at max level
    pub xp_next_level: Option<u64>,
    pub allocation: [u8; STAT_SLOTS],
    pub available_points: u32,
    pub total_points: u32,
}

impl GameState {
    /// View rectangle for the tank's current zoom
    pub fn camera(&self) -> CameraRect {
        let zoom = self.derived().zoom_mult;
        CameraRect::centered(
            self.tank.pos,
            self.tuning.view_width * zoom,
            self.tuning.view_height * zoom,
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        let stats = self.derived();
        Snapshot {
            tick: self.time_ticks,
            entities: self
                .entities
                .iter()
                .map(|e| EntityView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    angle: e.angle,
                    size: e.size,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    flash: e.flash,
                })
                .collect(),
            bullets: self
                .bullets
                .iter()
                .map(|b| BulletView {
                    pos: b.pos,
                    radius: b.radius,
                })
                .collect(),
            tank: TankView {
                pos: self.tank.pos,
                angle: self.tank.angle,
                hp: self.tank.hp,
                max_hp: stats.max_health,
                flash: self.tank.flash,
                size_mult: stats.size_mult,
            },
            camera: self.camera(),
        }
    }

    pub fn hud(&self) -> HudTelemetry {
        let level = self.tank.level;
        HudTelemetry {
            score: self.score,
            score_delta: self.score_delta,
            level,
            xp: self.tank.xp,
            xp_level_start: xp_for_level(level),
            xp_next_level: (level < MAX_LEVEL).then(|| xp_for_level(level + 1)),
            allocation: *self.tank.allocation.points(),
            available_points: self.tank.allocation.available(level),
            total_points: total_skill_points_for_level(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_camera_contains_with_margin() {
        let cam = CameraRect::centered(Vec2::new(100.0, 100.0), 200.0, 100.0);
        assert_eq!(cam.pos, Vec2::new(0.0, 50.0));
        assert_eq!(cam.center(), Vec2::new(100.0, 100.0));
        assert!(cam.contains(Vec2::new(150.0, 120.0), 0.0));
        assert!(!cam.contains(Vec2::new(250.0, 100.0), 0.0));
        assert!(cam.contains(Vec2::new(250.0, 100.0), 60.0));
    }

    #[test]
    fn test_camera_grows_with_level() {
        let mut state = GameState::empty(Tuning::default(), Pcg32::seed_from_u64(1));
        let before = state.camera();
        state.tank.level = 30;
        let after = state.camera();
        assert!(after.width > before.width);
        assert!((after.center() - state.tank.pos).length() < 1e-3);
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let state = GameState::with_seed(Tuning::default(), 5);
        let snap = state.snapshot();
        assert_eq!(snap.entities.len(), state.entities.len());
        assert_eq!(snap.tank.pos, state.tank.pos);
        assert!(serde_json::to_string(&snap).is_ok());
    }

    #[test]
    fn test_hud_thresholds() {
        let mut state = GameState::empty(Tuning::default(), Pcg32::seed_from_u64(1));
        let hud = state.hud();
        assert_eq!(hud.level, 1);
        assert_eq!(hud.available_points, 0);
        assert_eq!(hud.xp_next_level, Some(xp_for_level(2)));

        state.tank.add_xp(xp_for_level(MAX_LEVEL));
        let hud = state.hud();
        assert_eq!(hud.level, MAX_LEVEL);
        assert_eq!(hud.xp_next_level, None);
        assert_eq!(hud.available_points, 33);
    }
}
