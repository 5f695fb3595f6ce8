//! Arnab's Adventure - A side-scrolling platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, level geometry)
//! - `session`: Screen-level state machine (menu, level select, play, results)
//! - `driver`: Frame and countdown drivers fed by the host's clock
//! - `persistence`: Key/value storage and persistent progress
//! - `tuning`: Data-driven physics and difficulty

pub mod driver;
pub mod error;
pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;

pub use driver::Drivers;
pub use error::GameError;
pub use persistence::{KeyValueStore, MemoryStore, Progress};
pub use session::{LevelStatus, RunSummary, Selection, SessionController};
pub use sim::GamePhase;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Number of authored levels (indices are 1-based)
    pub const LEVEL_COUNT: u32 = 5;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 70.0;
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 400.0;
    pub const START_LIVES: u8 = 3;

    /// Countdown: base seconds plus a per-level increment
    pub const BASE_TIME_SECS: u32 = 180;
    pub const TIME_PER_LEVEL_SECS: u32 = 30;

    /// Score bonuses
    pub const COIN_SCORE: u64 = 10;
    pub const STOMP_SCORE: u64 = 50;
    pub const WIN_SCORE: u64 = 200;

    /// Coin pickup half-extent (center distance on each axis)
    pub const COIN_RADIUS: f32 = 30.0;
    /// Stomp counts if the player's bottom minus this is above the enemy midpoint
    pub const STOMP_TOLERANCE: f32 = 10.0;

    /// Flag proximity: horizontal half-extent, vertical half-extent, and the
    /// vertical offset from the flag's top to its collision center
    pub const FLAG_REACH_X: f32 = 35.0;
    pub const FLAG_REACH_Y: f32 = 45.0;
    pub const FLAG_CENTER_OFFSET_Y: f32 = 30.0;

    /// Toast display duration
    pub const TOAST_MS: u32 = 2000;

    /// Seed used for level generation when the host supplies none
    pub const DEFAULT_LEVEL_SEED: u64 = 0x00A2_4AB5;
}

/// Install logging and panic hooks for the browser build
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Arnab's Adventure core loaded");
}
