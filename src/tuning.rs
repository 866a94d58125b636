//! World and population tuning
//!
//! Formula constants live in [`crate::consts`]; this is the runtime-adjustable
//! part (world size, density caps, spawn pacing). Loaded from JSON, with any
//! missing key falling back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::geometry::ShapeKind;

/// Errors from reading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Population density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DensityPreset {
    Sparse,
    #[default]
    Normal,
    Crowded,
}

impl DensityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityPreset::Sparse => "Sparse",
            DensityPreset::Normal => "Normal",
            DensityPreset::Crowded => "Crowded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sparse" | "low" => Some(DensityPreset::Sparse),
            "normal" | "medium" | "med" => Some(DensityPreset::Normal),
            "crowded" | "high" => Some(DensityPreset::Crowded),
            _ => None,
        }
    }

    /// (square cap, triangle cap)
    pub fn caps(&self) -> (usize, usize) {
        match self {
            DensityPreset::Sparse => (20, 8),
            DensityPreset::Normal => (40, 16),
            DensityPreset::Crowded => (80, 32),
        }
    }

    /// Spawn attempts allowed per frame
    pub fn spawns_per_frame(&self) -> u32 {
        match self {
            DensityPreset::Sparse => 2,
            DensityPreset::Normal => 3,
            DensityPreset::Crowded => 5,
        }
    }
}

/// Runtime tuning for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub density: DensityPreset,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Unzoomed view size; scaled by the tank's zoom multiplier
    pub view_width: f32,
    pub view_height: f32,
    pub max_tick_dt: f32,

    // === Population ===
    pub square_cap: usize,
    pub triangle_cap: usize,
    /// Fraction of each cap kept filled by random spawns (reproduction fills the rest)
    pub target_fill: f32,
    /// Chance per entity per second of spawning a neighbour
    pub square_reproduction_rate: f32,
    pub triangle_reproduction_rate: f32,
    /// No spawn lands closer than this to the tank
    pub spawn_safe_radius: f32,
    pub max_spawns_per_frame: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        let preset = DensityPreset::default();
        let (square_cap, triangle_cap) = preset.caps();
        Self {
            density: preset,

            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            view_width: BASE_VIEW_WIDTH,
            view_height: BASE_VIEW_HEIGHT,
            max_tick_dt: MAX_TICK_DT,

            square_cap,
            triangle_cap,
            target_fill: 0.75,
            square_reproduction_rate: 0.02,
            triangle_reproduction_rate: 0.01,
            spawn_safe_radius: 400.0,
            max_spawns_per_frame: preset.spawns_per_frame(),
        }
    }
}

impl Tuning {
    /// Defaults with a density preset applied
    pub fn from_preset(preset: DensityPreset) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a density preset (updates caps and spawn pacing)
    pub fn apply_preset(&mut self, preset: DensityPreset) {
        let (square_cap, triangle_cap) = preset.caps();
        self.density = preset;
        self.square_cap = square_cap;
        self.triangle_cap = triangle_cap;
        self.max_spawns_per_frame = preset.spawns_per_frame();
    }

    pub fn cap_for(&self, kind: ShapeKind) -> usize {
        match kind {
            ShapeKind::Square => self.square_cap,
            ShapeKind::Triangle => self.triangle_cap,
        }
    }

    /// Population random spawns top up to
    pub fn target_for(&self, kind: ShapeKind) -> usize {
        let cap = self.cap_for(kind);
        ((cap as f32 * self.target_fill).round() as usize).min(cap)
    }

    pub fn reproduction_rate(&self, kind: ShapeKind) -> f32 {
        match kind {
            ShapeKind::Square => self.square_reproduction_rate,
            ShapeKind::Triangle => self.triangle_reproduction_rate,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(TuningError::Invalid("world dimensions must be positive"));
        }
        if !(self.view_width > 0.0 && self.view_height > 0.0) {
            return Err(TuningError::Invalid("view dimensions must be positive"));
        }
        if !(self.max_tick_dt > 0.0) {
            return Err(TuningError::Invalid("max_tick_dt must be positive"));
        }
        if !(0.0..=1.0).contains(&self.target_fill) {
            return Err(TuningError::Invalid("target_fill must be within 0..=1"));
        }
        if self.square_reproduction_rate < 0.0 || self.triangle_reproduction_rate < 0.0 {
            return Err(TuningError::Invalid("reproduction rates must be non-negative"));
        }
        if self.spawn_safe_radius < 0.0 {
            return Err(TuningError::Invalid("spawn_safe_radius must be non-negative"));
        }
        Ok(())
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path`, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning ({} density)", tuning.density.as_str());
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
