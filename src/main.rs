//! Tank Arena entry point
//!
//! Headless runner: loads tuning, lets the autopilot play for a while and
//! prints the final HUD and frame snapshot as JSON.
//!
//! Usage: `tank-arena [tuning.json]`
//!
//! Environment:
//! - `TANK_ARENA_TUNING`  tuning file when no argument is given
//! - `TANK_ARENA_DENSITY` sparse | normal | crowded, overrides the file
//! - `TANK_ARENA_SECONDS` simulated seconds (default 60)
//! - `TANK_ARENA_SEED`    fixed RNG seed

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tank_arena::consts::*;
    use tank_arena::sim::{GameEvent, GameState, StatSlot, TickInput, tick};
    use tank_arena::{DensityPreset, Tuning};

    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    let tuning_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TANK_ARENA_TUNING").ok());
    let mut tuning = match tuning_path {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    if let Some(preset) = std::env::var("TANK_ARENA_DENSITY")
        .ok()
        .and_then(|s| DensityPreset::parse(&s))
    {
        tuning.apply_preset(preset);
    }
    if let Err(e) = tuning.validate() {
        log::warn!("{e}; using default tuning");
        tuning = Tuning::default();
    }

    let seconds: u32 = std::env::var("TANK_ARENA_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);
    let mut state = match std::env::var("TANK_ARENA_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        Some(seed) => GameState::with_seed(tuning, seed),
        None => GameState::new(tuning),
    };

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut effects = Vec::new();
    let mut next_slot = 0;
    let mut deaths = 0;

    for frame in 1..=seconds * SIM_HZ {
        tick(&mut state, &input, SIM_DT, &mut effects);
        deaths += state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::TankDestroyed))
            .count();

        // Spend points round-robin, skipping slots that refuse
        for _ in 0..STAT_SLOTS {
            if state.tank.allocation.available(state.tank.level) == 0 {
                break;
            }
            let slot = StatSlot::ALL[next_slot % STAT_SLOTS];
            next_slot += 1;
            state.allocate_stat_point(slot);
        }

        if frame % SIM_HZ == 0 {
            let hud = state.hud();
            log::info!(
                "t={}s level={} score={} entities={} bullets={} effects={}",
                frame / SIM_HZ,
                hud.level,
                hud.score,
                state.entities.len(),
                state.bullets.len(),
                effects.len()
            );
        }
    }

    log::info!("Finished after {} ticks, tank destroyed {} times", state.time_ticks, deaths);
    match serde_json::to_string_pretty(&state.hud()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode HUD: {e}"),
    }
    match serde_json::to_string(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by an embedding host on the web
}
